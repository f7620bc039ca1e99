//! Node/Sensor Store
//!
//! The single shared mutable resource of the system:
//!
//! - **types**: Node and Sensor records
//! - **backend**: the [`NodeStore`] trait the rest of the crate depends on
//! - **memory**: thread-safe in-memory implementation
//! - **seed**: bootstrap dataset and JSON seed files
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use sensor_tree::store::{MemoryStore, NodeStore, SeedData};
//!
//! let store = MemoryStore::from_seed(SeedData::bootstrap()).unwrap();
//! let roots = store.find_children(None).unwrap();
//! assert_eq!(roots.len(), 3);
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod seed;
pub mod types;

pub use backend::NodeStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use seed::SeedData;
pub use types::{Node, Sensor, StoreStats};
