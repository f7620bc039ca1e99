//! Reveal Route
//!
//! - GET /api/reveal-path/:id - Breadcrumb plus the children of every ancestor

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use std::sync::Arc;

use super::nodes::validate_node_id;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::tree::RevealedPath;

/// GET /api/reveal-path/:id
///
/// Works for both node and sensor ids. Unknown ids answer with an empty
/// path and an empty children map.
pub async fn reveal_path(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<RevealedPath>> {
    let Path(id) = id?;
    validate_node_id(&id)?;

    let revealed = state.tree.reveal_path(&id)?;
    Ok(Json(revealed))
}
