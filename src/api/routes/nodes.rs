//! Node Routes
//!
//! Lazy tree browsing.
//!
//! - GET /api/nodes/root - Top-level folders
//! - GET /api/nodes/:id/children - Folders and sensors directly under a node

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::tree::PathEntry;

const NODE_ID_PATTERN: &str = r"^[a-zA-Z0-9\-_]+$";

/// GET /api/nodes/root
pub async fn root_nodes(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<PathEntry>>> {
    let roots = state.tree.get_root_nodes()?;
    Ok(Json(roots))
}

/// GET /api/nodes/:id/children
///
/// Unknown ids answer with an empty list.
pub async fn children(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<PathEntry>>> {
    let Path(id) = id?;
    validate_node_id(&id)?;

    let children = state.tree.get_children_of(Some(&id))?;
    tracing::debug!(node_id = %id, count = children.len(), "Listed children");

    Ok(Json(children))
}

static NODE_ID: OnceLock<Regex> = OnceLock::new();

/// Node id pattern, compiled on first use
fn node_id_pattern() -> ApiResult<&'static Regex> {
    if let Some(re) = NODE_ID.get() {
        return Ok(re);
    }
    let re = Regex::new(NODE_ID_PATTERN)
        .map_err(|e| ApiError::Internal(format!("Invalid id pattern: {}", e)))?;
    Ok(NODE_ID.get_or_init(|| re))
}

/// Reject ids outside the store's key alphabet
pub(crate) fn validate_node_id(id: &str) -> ApiResult<()> {
    if !node_id_pattern()?.is_match(id) {
        return Err(ApiError::invalid_field(
            "Invalid request parameters",
            "id",
            "Invalid node ID format",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_node_id() {
        assert!(validate_node_id("node-1-1").is_ok());
        assert!(validate_node_id("sensor_temp_1").is_ok());
        assert!(validate_node_id("42").is_ok());

        assert!(validate_node_id("").is_err());
        assert!(validate_node_id("node 1").is_err());
        assert!(validate_node_id("node;drop").is_err());
        assert!(validate_node_id("../etc").is_err());
    }

    #[test]
    fn test_id_pattern_compiled_once() {
        let first = node_id_pattern().unwrap();
        let second = node_id_pattern().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_invalid_id_details() {
        match validate_node_id("a.b") {
            Err(ApiError::Validation { details, .. }) => {
                assert_eq!(details.get("id").map(String::as_str), Some("Invalid node ID format"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
