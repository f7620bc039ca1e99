//! # Sensor Tree
//!
//! A browsable inventory of folder-like nodes and the sensors attached to
//! them, served over HTTP with a live rename feed over WebSocket.
//!
//! ## Features
//!
//! - **Lazy browsing**: root nodes and per-node children on demand
//! - **Path reveal**: breadcrumb to any node or sensor, with every ancestor expanded
//! - **Search**: case-insensitive substring search over names and metadata
//! - **Real-time**: periodic node renames pushed to every WebSocket client
//!
//! ## Modules
//!
//! - [`store`]: Node and sensor records behind the [`NodeStore`] trait
//! - [`tree`]: Path resolution, search and the tree service
//! - [`websocket`]: Update broadcaster and WebSocket handler
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use sensor_tree::store::{MemoryStore, SeedData};
//! use sensor_tree::tree::TreeService;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::from_seed(SeedData::bootstrap()).unwrap());
//! let tree = TreeService::new(store);
//!
//! // "germany" only appears in metadata
//! let hits = tree.search("germany").unwrap();
//! assert_eq!(hits[0].id, "node-1-1");
//! assert_eq!(hits[0].path.len(), 2);
//! ```

pub mod api;
pub mod config;
pub mod store;
pub mod tree;
pub mod websocket;

// Re-export top-level types for convenience
pub use store::{MemoryStore, Node, NodeStore, SeedData, Sensor, StoreError, StoreResult};

pub use tree::{
    ItemKind, PathEntry, PathResolver, RevealedPath, SearchEngine, SearchResult, TreeItem,
    TreeService,
};

pub use websocket::{BroadcastError, NameUpdate, UpdateBroadcaster, websocket_handler};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{
    ApiConfig, BroadcasterConfig, Config, ConfigError, LoggingConfig, StoreConfig,
};
