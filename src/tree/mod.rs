//! Tree Query Engine
//!
//! Read-side logic over the node/sensor store:
//!
//! - **item**: `TreeItem` union and the `PathEntry` wire shape
//! - **path**: breadcrumb resolution (`PathResolver`) and `RevealedPath`
//! - **search**: combined name/metadata search (`SearchEngine`)
//! - **service**: the `TreeService` facade used by the HTTP layer
//!
//! # Example
//!
//! ```rust
//! use sensor_tree::store::{MemoryStore, SeedData};
//! use sensor_tree::tree::TreeService;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::from_seed(SeedData::bootstrap()).unwrap());
//! let tree = TreeService::new(store);
//!
//! let revealed = tree.reveal_path("node-1-1-1").unwrap();
//! assert_eq!(revealed.path.len(), 3);
//! assert!(!revealed.children_map.contains_key("node-1-1-1"));
//! ```

pub mod item;
pub mod path;
pub mod search;
pub mod service;

pub use item::{FolderItem, ItemKind, PathEntry, TreeItem};
pub use path::{PathResolver, RevealedPath};
pub use search::{SearchEngine, SearchResult};
pub use service::TreeService;
