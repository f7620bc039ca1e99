//! Tree Service
//!
//! Facade over the store, the path resolver and the search engine.
//! Holds no copies of records: every call reads the store again, so names
//! always reflect the latest broadcaster rename.

use std::collections::HashMap;
use std::sync::Arc;

use super::item::{sort_entries, PathEntry, TreeItem};
use super::path::{PathResolver, RevealedPath};
use super::search::{SearchEngine, SearchResult};
use crate::store::{NodeStore, StoreResult};

/// Read-only tree queries
#[derive(Clone)]
pub struct TreeService {
    store: Arc<dyn NodeStore>,
    resolver: PathResolver,
    search: SearchEngine,
}

impl TreeService {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        let resolver = PathResolver::new(Arc::clone(&store));
        let search = SearchEngine::new(Arc::clone(&store), resolver.clone());

        Self {
            store,
            resolver,
            search,
        }
    }

    /// Top-level nodes, sorted by name
    pub fn get_root_nodes(&self) -> StoreResult<Vec<PathEntry>> {
        let mut entries = self.folder_entries(None)?;
        sort_entries(&mut entries);
        Ok(entries)
    }

    /// Direct child folders of `parent_id` followed by its attached sensors.
    ///
    /// Each group is sorted by name. `None` lists the roots; an unknown id
    /// yields an empty list.
    pub fn get_children_of(&self, parent_id: Option<&str>) -> StoreResult<Vec<PathEntry>> {
        let Some(parent_id) = parent_id else {
            return self.get_root_nodes();
        };

        let mut folders = self.folder_entries(Some(parent_id))?;
        sort_entries(&mut folders);

        let mut sensors: Vec<PathEntry> = self
            .store
            .find_sensors_of(parent_id)?
            .into_iter()
            .map(|sensor| TreeItem::Sensor(sensor).into())
            .collect();
        sort_entries(&mut sensors);

        folders.extend(sensors);
        Ok(folders)
    }

    /// Breadcrumb of a node or sensor, root first
    pub fn resolve_path(&self, item_id: &str) -> StoreResult<Vec<PathEntry>> {
        self.resolver.resolve_path(item_id)
    }

    /// Breadcrumb plus the children of every path entry other than the target.
    ///
    /// For a node the target is the last entry, so only its ancestors are
    /// expanded. For a sensor every entry (including the owning node) is
    /// expanded so the sensor itself becomes visible.
    pub fn reveal_path(&self, item_id: &str) -> StoreResult<RevealedPath> {
        let path = self.resolver.resolve_path(item_id)?;

        let mut children_map = HashMap::new();
        for entry in path.iter().filter(|e| e.id != item_id) {
            let children = self.get_children_of(Some(&entry.id))?;
            children_map.insert(entry.id.clone(), children);
        }

        tracing::debug!(
            item_id = %item_id,
            depth = path.len(),
            expanded = children_map.len(),
            "Revealed path"
        );

        Ok(RevealedPath { path, children_map })
    }

    /// Name and metadata search across nodes and sensors
    pub fn search(&self, query: &str) -> StoreResult<Vec<SearchResult>> {
        self.search.search(query)
    }

    fn folder_entries(&self, parent_id: Option<&str>) -> StoreResult<Vec<PathEntry>> {
        self.store
            .find_children(parent_id)?
            .into_iter()
            .map(|node| TreeItem::folder(self.store.as_ref(), node).map(PathEntry::from))
            .collect()
    }
}
