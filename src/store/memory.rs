//! In-memory store
//!
//! Records live in id-ordered maps behind a single `RwLock`, which gives
//! per-record atomicity for renames and stable iteration order for listings.

use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::backend::NodeStore;
use super::error::{StoreError, StoreResult};
use super::seed::SeedData;
use super::types::{contains_ignore_case, metadata_contains, Node, Sensor, StoreStats};

#[derive(Debug, Default)]
struct Records {
    nodes: BTreeMap<String, Node>,
    sensors: BTreeMap<String, Sensor>,
}

impl Records {
    /// Check that attaching `node` under its parent keeps the graph a tree.
    fn check_parent(&self, node: &Node) -> StoreResult<()> {
        let Some(parent_id) = node.parent_id.as_deref() else {
            return Ok(());
        };

        if !self.nodes.contains_key(parent_id) {
            return Err(StoreError::InvalidReference(format!(
                "node {} references missing parent {}",
                node.id, parent_id
            )));
        }

        let mut seen = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(id) = current {
            if id == node.id {
                return Err(StoreError::Cycle(format!(
                    "node {} would become its own ancestor",
                    node.id
                )));
            }
            if !seen.insert(id) {
                return Err(StoreError::Corruption(format!(
                    "parent chain of {} loops at {}",
                    node.id, id
                )));
            }
            current = self.nodes.get(id).and_then(|n| n.parent_id.as_deref());
        }

        Ok(())
    }
}

/// Thread-safe in-memory [`NodeStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store populated from seed data.
    ///
    /// Nodes are inserted parents-first regardless of their order in the seed.
    pub fn from_seed(seed: SeedData) -> StoreResult<Self> {
        let store = Self::new();

        let mut pending = seed.nodes;
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();

            for node in pending {
                let ready = match node.parent_id.as_deref() {
                    None => true,
                    Some(parent) => store.find_node(parent)?.is_some(),
                };
                if ready {
                    store.save_node(node)?;
                } else {
                    deferred.push(node);
                }
            }

            if deferred.len() == before {
                let ids: Vec<&str> = deferred.iter().map(|n| n.id.as_str()).collect();
                return Err(StoreError::InvalidReference(format!(
                    "unresolvable parents for nodes: {}",
                    ids.join(", ")
                )));
            }
            pending = deferred;
        }

        for sensor in seed.sensors {
            store.save_sensor(sensor)?;
        }

        let stats = store.stats()?;
        tracing::debug!(
            nodes = stats.nodes,
            sensors = stats.sensors,
            "Store seeded"
        );

        Ok(store)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Records>> {
        self.records
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn collect_nodes<F>(&self, predicate: F) -> StoreResult<Vec<Node>>
    where
        F: Fn(&Node) -> bool,
    {
        let records = self.read()?;
        Ok(records
            .nodes
            .values()
            .filter(|n| predicate(n))
            .cloned()
            .collect())
    }

    fn collect_sensors<F>(&self, predicate: F) -> StoreResult<Vec<Sensor>>
    where
        F: Fn(&Sensor) -> bool,
    {
        let records = self.read()?;
        Ok(records
            .sensors
            .values()
            .filter(|s| predicate(s))
            .cloned()
            .collect())
    }
}

impl NodeStore for MemoryStore {
    fn find_node(&self, id: &str) -> StoreResult<Option<Node>> {
        Ok(self.read()?.nodes.get(id).cloned())
    }

    fn find_sensor(&self, id: &str) -> StoreResult<Option<Sensor>> {
        Ok(self.read()?.sensors.get(id).cloned())
    }

    fn find_children(&self, parent_id: Option<&str>) -> StoreResult<Vec<Node>> {
        self.collect_nodes(|n| n.parent_id.as_deref() == parent_id)
    }

    fn find_sensors_of(&self, node_id: &str) -> StoreResult<Vec<Sensor>> {
        self.collect_sensors(|s| s.node_id == node_id)
    }

    fn has_children(&self, node_id: &str) -> StoreResult<bool> {
        let records = self.read()?;
        let has_nodes = records
            .nodes
            .values()
            .any(|n| n.parent_id.as_deref() == Some(node_id));
        Ok(has_nodes || records.sensors.values().any(|s| s.node_id == node_id))
    }

    fn find_nodes_by_name(&self, query: &str) -> StoreResult<Vec<Node>> {
        let needle = query.to_lowercase();
        self.collect_nodes(|n| contains_ignore_case(&n.name, &needle))
    }

    fn find_nodes_by_metadata(&self, query: &str) -> StoreResult<Vec<Node>> {
        let needle = query.to_lowercase();
        self.collect_nodes(|n| metadata_contains(&n.metadata, &needle))
    }

    fn find_sensors_by_name(&self, query: &str) -> StoreResult<Vec<Sensor>> {
        let needle = query.to_lowercase();
        self.collect_sensors(|s| contains_ignore_case(&s.name, &needle))
    }

    fn find_sensors_by_metadata(&self, query: &str) -> StoreResult<Vec<Sensor>> {
        let needle = query.to_lowercase();
        self.collect_sensors(|s| metadata_contains(&s.metadata, &needle))
    }

    fn all_nodes(&self) -> StoreResult<Vec<Node>> {
        Ok(self.read()?.nodes.values().cloned().collect())
    }

    fn save_node(&self, node: Node) -> StoreResult<()> {
        let mut records = self.write()?;
        records.check_parent(&node)?;
        records.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn save_sensor(&self, sensor: Sensor) -> StoreResult<()> {
        let mut records = self.write()?;
        if !records.nodes.contains_key(&sensor.node_id) {
            return Err(StoreError::InvalidReference(format!(
                "sensor {} references missing node {}",
                sensor.id, sensor.node_id
            )));
        }
        records.sensors.insert(sensor.id.clone(), sensor);
        Ok(())
    }

    fn rename_node(&self, id: &str, name: &str) -> StoreResult<Option<Node>> {
        let mut records = self.write()?;
        Ok(records.nodes.get_mut(id).map(|node| {
            node.name = name.to_string();
            node.clone()
        }))
    }

    fn stats(&self) -> StoreResult<StoreStats> {
        let records = self.read()?;
        Ok(StoreStats {
            nodes: records.nodes.len(),
            sensors: records.sensors.len(),
        })
    }
}
