//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Tree-shaped responses reuse [`PathEntry`](crate::tree::PathEntry),
//! [`SearchResult`](crate::tree::SearchResult) and
//! [`RevealedPath`](crate::tree::RevealedPath) directly.

use serde::{Deserialize, Serialize};

use crate::store::StoreStats;
use crate::websocket::BroadcasterStats;

/// Maximum accepted search query length, in characters
pub const MAX_QUERY_LENGTH: usize = 100;

// ============================================
// SEARCH DTOs
// ============================================

/// Search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Substring to look for; a missing field counts as blank
    #[serde(default)]
    pub query: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Store status: ok, error
    pub store: String,
    /// Record counts, absent when the store is unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<StoreStats>,
    /// Live update feed state
    pub broadcaster: BroadcasterStats,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_missing_query_is_blank() {
        let req: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_empty());
    }
}
