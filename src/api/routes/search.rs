//! Search Route
//!
//! - POST /api/search - Case-insensitive substring search over names and metadata

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{SearchRequest, MAX_QUERY_LENGTH};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::tree::SearchResult;

/// POST /api/search
///
/// Request body:
/// ```json
/// { "query": "factory" }
/// ```
pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let Json(req) = body?;
    validate_query(&req.query)?;

    let results = state.tree.search(&req.query)?;
    Ok(Json(results))
}

/// Validate a search query
fn validate_query(query: &str) -> ApiResult<()> {
    if query.trim().is_empty() {
        return Err(ApiError::invalid_field(
            "Invalid request body",
            "query",
            "Search query cannot be empty.",
        ));
    }

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ApiError::invalid_field(
            "Invalid request body",
            "query",
            format!("Search query cannot exceed {} characters.", MAX_QUERY_LENGTH),
        ));
    }

    Ok(())
}
