//! Path resolution
//!
//! Walks parent links from a node (or a sensor's owning node) up to its root
//! and returns the breadcrumb in root-first order.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::item::{PathEntry, TreeItem};
use crate::store::{Node, NodeStore, StoreError, StoreResult};

/// A breadcrumb plus the children of every ancestor, used to pre-expand a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedPath {
    pub path: Vec<PathEntry>,
    pub children_map: HashMap<String, Vec<PathEntry>>,
}

/// Resolves root-to-target breadcrumbs
#[derive(Clone)]
pub struct PathResolver {
    store: Arc<dyn NodeStore>,
}

impl PathResolver {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Resolve the path of a node or sensor.
    ///
    /// A node's path ends with the node itself. A sensor's path is the path
    /// of its owning node; the sensor never appears as an entry.
    /// Unknown ids resolve to an empty path.
    pub fn resolve_path(&self, item_id: &str) -> StoreResult<Vec<PathEntry>> {
        let chain = self.ancestor_chain(item_id)?;

        chain
            .into_iter()
            .map(|node| TreeItem::folder(self.store.as_ref(), node).map(PathEntry::from))
            .collect()
    }

    /// Node chain from root to the starting node of `item_id`
    fn ancestor_chain(&self, item_id: &str) -> StoreResult<Vec<Node>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.start_node(item_id)?;

        while let Some(node) = current {
            if !visited.insert(node.id.clone()) {
                return Err(StoreError::Corruption(format!(
                    "parent chain of {} revisits {}",
                    item_id, node.id
                )));
            }

            current = match node.parent_id.as_deref() {
                Some(parent_id) => self.store.find_node(parent_id)?,
                None => None,
            };
            chain.push(node);
        }

        chain.reverse();
        Ok(chain)
    }

    fn start_node(&self, item_id: &str) -> StoreResult<Option<Node>> {
        if let Some(node) = self.store.find_node(item_id)? {
            return Ok(Some(node));
        }

        match self.store.find_sensor(item_id)? {
            Some(sensor) => self.store.find_node(&sensor.node_id),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SeedData};

    fn resolver() -> PathResolver {
        let store = MemoryStore::from_seed(SeedData::bootstrap()).unwrap();
        PathResolver::new(Arc::new(store))
    }

    fn ids(path: &[PathEntry]) -> Vec<&str> {
        path.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_resolve_nested_node() {
        let path = resolver().resolve_path("node-1-1-1").unwrap();
        assert_eq!(ids(&path), vec!["node-1", "node-1-1", "node-1-1-1"]);
    }

    #[test]
    fn test_resolve_root_node() {
        let path = resolver().resolve_path("node-2").unwrap();
        assert_eq!(ids(&path), vec!["node-2"]);
        assert!(path[0].parent_id.is_none());
    }

    #[test]
    fn test_path_ends_with_node_and_parent_precedes_it() {
        let resolver = resolver();
        let store = MemoryStore::from_seed(SeedData::bootstrap()).unwrap();

        for node in store.all_nodes().unwrap() {
            let path = resolver.resolve_path(&node.id).unwrap();
            assert_eq!(path.last().unwrap().id, node.id);

            if let Some(parent_id) = &node.parent_id {
                assert_eq!(&path[path.len() - 2].id, parent_id);
            } else {
                assert_eq!(path.len(), 1);
            }
        }
    }

    #[test]
    fn test_sensor_path_is_owner_path() {
        let resolver = resolver();
        let sensor_path = resolver.resolve_path("sensor-temp-1").unwrap();
        let owner_path = resolver.resolve_path("node-1-1").unwrap();

        assert_eq!(sensor_path, owner_path);
        assert!(sensor_path.iter().all(|e| e.id != "sensor-temp-1"));
    }

    #[test]
    fn test_unknown_id_is_empty() {
        assert!(resolver().resolve_path("does-not-exist").unwrap().is_empty());
    }
}
