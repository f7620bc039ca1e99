//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, BroadcasterConfig};
use crate::store::NodeStore;
use crate::tree::TreeService;
use crate::websocket::UpdateBroadcaster;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store, read directly only by health checks
    pub store: Arc<dyn NodeStore>,
    /// Tree queries for the REST endpoints
    pub tree: Arc<TreeService>,
    /// Live update feed for WebSocket clients
    pub broadcaster: Arc<UpdateBroadcaster>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state with a broadcaster built over the same store
    pub fn new(
        store: Arc<dyn NodeStore>,
        config: ApiConfig,
        broadcaster_config: BroadcasterConfig,
    ) -> Self {
        let broadcaster = Arc::new(UpdateBroadcaster::new(
            Arc::clone(&store),
            broadcaster_config,
        ));
        Self::with_broadcaster(store, config, broadcaster)
    }

    /// Create state around an existing broadcaster
    pub fn with_broadcaster(
        store: Arc<dyn NodeStore>,
        config: ApiConfig,
        broadcaster: Arc<UpdateBroadcaster>,
    ) -> Self {
        Self {
            tree: Arc::new(TreeService::new(Arc::clone(&store))),
            store,
            broadcaster,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
