//! Name and metadata search over nodes and sensors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::item::{ItemKind, PathEntry};
use super::path::PathResolver;
use crate::store::{NodeStore, StoreResult};

/// A single search hit with the breadcrumb leading to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub path: Vec<PathEntry>,
}

/// Combines name and metadata matches across nodes and sensors
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn NodeStore>,
    resolver: PathResolver,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn NodeStore>, resolver: PathResolver) -> Self {
        Self { store, resolver }
    }

    /// Search for `query` in names and metadata values.
    ///
    /// Node hits come first, then sensor hits; each group is deduplicated
    /// and ordered by id. The query is expected to be validated already.
    pub fn search(&self, query: &str) -> StoreResult<Vec<SearchResult>> {
        let mut nodes = BTreeMap::new();
        for node in self
            .store
            .find_nodes_by_name(query)?
            .into_iter()
            .chain(self.store.find_nodes_by_metadata(query)?)
        {
            nodes.entry(node.id.clone()).or_insert(node);
        }

        let mut sensors = BTreeMap::new();
        for sensor in self
            .store
            .find_sensors_by_name(query)?
            .into_iter()
            .chain(self.store.find_sensors_by_metadata(query)?)
        {
            sensors.entry(sensor.id.clone()).or_insert(sensor);
        }

        let hits = nodes
            .into_values()
            .map(|n| (n.id, n.name, ItemKind::Folder))
            .chain(
                sensors
                    .into_values()
                    .map(|s| (s.id, s.name, ItemKind::Sensor)),
            );

        let mut results = Vec::new();
        for (id, name, kind) in hits {
            let path = self.resolver.resolve_path(&id)?;
            results.push(SearchResult {
                id,
                name,
                kind,
                path,
            });
        }

        tracing::debug!(query = %query, hits = results.len(), "Search completed");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SeedData};

    fn engine() -> SearchEngine {
        let store: Arc<dyn NodeStore> =
            Arc::new(MemoryStore::from_seed(SeedData::bootstrap()).unwrap());
        let resolver = PathResolver::new(Arc::clone(&store));
        SearchEngine::new(store, resolver)
    }

    fn names(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_search_by_name_case_insensitive() {
        let results = engine().search("factory").unwrap();
        assert_eq!(names(&results), vec!["Factory A (EU)", "Factory B (APAC)"]);
        assert!(!names(&results).contains(&"Logistics (28)"));

        let upper = engine().search("FACTORY").unwrap();
        assert_eq!(results, upper);
    }

    #[test]
    fn test_search_by_metadata() {
        let results = engine().search("germany").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "node-1-1");
        assert_eq!(results[0].kind, ItemKind::Folder);
    }

    #[test]
    fn test_match_on_name_and_metadata_counts_once() {
        // "a" hits many records through both their name and their metadata
        let results = engine().search("a").unwrap();
        let mut ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_nodes_before_sensors() {
        let results = engine().search("e").unwrap();
        let first_sensor = results
            .iter()
            .position(|r| r.kind == ItemKind::Sensor)
            .unwrap();
        assert!(results[..first_sensor]
            .iter()
            .all(|r| r.kind == ItemKind::Folder));
        assert!(results[first_sensor..]
            .iter()
            .all(|r| r.kind == ItemKind::Sensor));
    }

    #[test]
    fn test_sensor_hit_path_is_owner_path() {
        let results = engine().search("gps").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, ItemKind::Sensor);
        let path_ids: Vec<_> = results[0].path.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(path_ids, vec!["node-2"]);
    }

    #[test]
    fn test_surrounding_whitespace_is_part_of_query() {
        // Only "Factory A (EU)" contains "a " followed by a space
        let results = engine().search("A ").unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["node-1-1"]);
    }

    #[test]
    fn test_no_match() {
        assert!(engine().search("zeppelin").unwrap().is_empty());
    }
}
