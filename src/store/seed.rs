//! Seed data
//!
//! The fixed bootstrap dataset and loading of alternative datasets from
//! JSON files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::StoreResult;
use super::types::{Node, Sensor};

/// A full set of records to load into a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl SeedData {
    /// Read a JSON seed file of the form `{"nodes": [...], "sensors": [...]}`
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let seed = serde_json::from_str(&content)?;
        Ok(seed)
    }

    /// The reference inventory: three sites, a factory floor and three sensors.
    pub fn bootstrap() -> Self {
        let nodes = vec![
            // Roots
            Node::root("node-1", "Manufacturing (53)")
                .meta("owner", "Alice")
                .meta("last_updated", "2025-09-18"),
            Node::root("node-2", "Logistics (28)")
                .meta("owner", "Bob")
                .meta("region", "Global"),
            Node::root("node-3", "R&D (15)").meta("budget", "$5M"),
            // Sites
            Node::child("node-1-1", "Factory A (EU)", "node-1").meta("location", "Germany"),
            Node::child("node-1-2", "Factory B (APAC)", "node-1")
                .meta("location", "South Korea"),
            Node::child("node-2-1", "Warehouse X (US)", "node-2").meta("manager", "Charlie"),
            // Lines
            Node::child("node-1-1-1", "Production Line 1 (21)", "node-1-1")
                .meta("product", "Widget A"),
            Node::child("node-1-1-2", "Production Line 2 (89)", "node-1-1")
                .meta("product", "Widget B"),
        ];

        let sensors = vec![
            Sensor::new("sensor-temp-1", "Temperature Sensor", "node-1-1")
                .meta("unit", "Celsius")
                .meta("value", "25.5"),
            Sensor::new("sensor-humidity-1", "Humidity Sensor", "node-1-1")
                .meta("unit", "%")
                .meta("value", "60"),
            Sensor::new("sensor-logistics-1", "GPS Tracker", "node-2")
                .meta("battery", "80%")
                .meta("accuracy", "5m"),
        ];

        Self { nodes, sensors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use std::io::Write;

    #[test]
    fn test_bootstrap_counts() {
        let seed = SeedData::bootstrap();
        assert_eq!(seed.nodes.len(), 8);
        assert_eq!(seed.sensors.len(), 3);
        assert_eq!(seed.nodes.iter().filter(|n| n.is_root()).count(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "nodes": [{{"id": "site", "name": "Site", "metadata": {{"region": "EU"}}}}],
                "sensors": [{{"id": "probe", "name": "Probe", "nodeId": "site"}}]
            }}"#
        )
        .unwrap();

        let seed = SeedData::load(file.path()).unwrap();
        assert_eq!(seed.nodes.len(), 1);
        assert_eq!(seed.sensors[0].node_id, "site");
    }

    #[test]
    fn test_load_missing_file() {
        let result = SeedData::load(Path::new("/nonexistent/seed.json"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
