//! Store abstraction
//!
//! The tree engine and the broadcaster only talk to the store through
//! [`NodeStore`], so the persistence technology stays swappable.

use super::error::StoreResult;
use super::types::{Node, Sensor, StoreStats};

/// Lookup, search and upsert operations over node and sensor records.
///
/// Every read returns owned copies; callers never hold references into the
/// store, so a later rename is always observed by the next read.
/// Text searches are case-insensitive substring matches.
pub trait NodeStore: Send + Sync {
    /// Look up a node by id
    fn find_node(&self, id: &str) -> StoreResult<Option<Node>>;

    /// Look up a sensor by id
    fn find_sensor(&self, id: &str) -> StoreResult<Option<Sensor>>;

    /// Direct child nodes of `parent_id`; `None` lists the roots
    fn find_children(&self, parent_id: Option<&str>) -> StoreResult<Vec<Node>>;

    /// Sensors attached to `node_id`
    fn find_sensors_of(&self, node_id: &str) -> StoreResult<Vec<Sensor>>;

    /// True if any node or sensor hangs directly under `node_id`
    fn has_children(&self, node_id: &str) -> StoreResult<bool>;

    fn find_nodes_by_name(&self, query: &str) -> StoreResult<Vec<Node>>;

    fn find_nodes_by_metadata(&self, query: &str) -> StoreResult<Vec<Node>>;

    fn find_sensors_by_name(&self, query: &str) -> StoreResult<Vec<Sensor>>;

    fn find_sensors_by_metadata(&self, query: &str) -> StoreResult<Vec<Sensor>>;

    /// Every node in the store
    fn all_nodes(&self) -> StoreResult<Vec<Node>>;

    /// Insert or replace a node
    fn save_node(&self, node: Node) -> StoreResult<()>;

    /// Insert or replace a sensor
    fn save_sensor(&self, sensor: Sensor) -> StoreResult<()>;

    /// Atomically replace a node's name.
    ///
    /// Returns the updated node, or `None` if the id is unknown.
    fn rename_node(&self, id: &str, name: &str) -> StoreResult<Option<Node>>;

    /// Record counts
    fn stats(&self) -> StoreResult<StoreStats>;
}
