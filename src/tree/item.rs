//! Tree items and their wire representation.
//!
//! Folders and sensors both appear as children of a node and as search hits.
//! [`TreeItem`] is the closed union over the two; each variant maps into a
//! [`PathEntry`] through its own `From` impl.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::store::{Node, NodeStore, Sensor, StoreResult};

/// Discriminator serialized as the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    Sensor,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Folder => "folder",
            ItemKind::Sensor => "sensor",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Node-shaped representation shared by every tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub has_children: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Sensors attached to a folder; never present on sensor entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensors: Option<Vec<PathEntry>>,
}

/// A node together with the derived data its entry needs
#[derive(Debug, Clone)]
pub struct FolderItem {
    pub node: Node,
    pub has_children: bool,
    pub sensors: Vec<Sensor>,
}

/// Anything that can sit under a node
#[derive(Debug, Clone)]
pub enum TreeItem {
    Folder(FolderItem),
    Sensor(Sensor),
}

impl TreeItem {
    /// Load the derived folder data for `node` from the store
    pub fn folder(store: &dyn NodeStore, node: Node) -> StoreResult<Self> {
        let mut sensors = store.find_sensors_of(&node.id)?;
        sensors.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        let has_children = store.has_children(&node.id)?;

        Ok(TreeItem::Folder(FolderItem {
            node,
            has_children,
            sensors,
        }))
    }

    pub fn id(&self) -> &str {
        match self {
            TreeItem::Folder(folder) => &folder.node.id,
            TreeItem::Sensor(sensor) => &sensor.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeItem::Folder(folder) => &folder.node.name,
            TreeItem::Sensor(sensor) => &sensor.name,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            TreeItem::Folder(_) => ItemKind::Folder,
            TreeItem::Sensor(_) => ItemKind::Sensor,
        }
    }
}

impl From<FolderItem> for PathEntry {
    fn from(folder: FolderItem) -> Self {
        let FolderItem {
            node,
            has_children,
            sensors,
        } = folder;

        PathEntry {
            id: node.id,
            name: node.name,
            kind: ItemKind::Folder,
            parent_id: node.parent_id,
            has_children,
            metadata: node.metadata,
            sensors: Some(sensors.into_iter().map(PathEntry::from).collect()),
        }
    }
}

impl From<Sensor> for PathEntry {
    fn from(sensor: Sensor) -> Self {
        PathEntry {
            id: sensor.id,
            name: sensor.name,
            kind: ItemKind::Sensor,
            parent_id: Some(sensor.node_id),
            has_children: false,
            metadata: sensor.metadata,
            sensors: None,
        }
    }
}

impl From<TreeItem> for PathEntry {
    fn from(item: TreeItem) -> Self {
        match item {
            TreeItem::Folder(folder) => folder.into(),
            TreeItem::Sensor(sensor) => sensor.into(),
        }
    }
}

/// Total order used for every listing: name, then id as tie-breaker.
pub(crate) fn sort_entries(entries: &mut [PathEntry]) {
    entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SeedData};

    #[test]
    fn test_sensor_entry_is_leaf() {
        let sensor = Sensor::new("sensor-temp-1", "Temperature Sensor", "node-1-1")
            .meta("unit", "Celsius");
        let entry = PathEntry::from(TreeItem::Sensor(sensor));

        assert_eq!(entry.kind, ItemKind::Sensor);
        assert!(!entry.has_children);
        assert_eq!(entry.parent_id.as_deref(), Some("node-1-1"));
        assert!(entry.sensors.is_none());
    }

    #[test]
    fn test_folder_entry_carries_sensors() {
        let store = MemoryStore::from_seed(SeedData::bootstrap()).unwrap();
        let node = store.find_node("node-1-1").unwrap().unwrap();

        let item = TreeItem::folder(&store, node).unwrap();
        assert_eq!(item.kind(), ItemKind::Folder);
        assert_eq!(item.id(), "node-1-1");

        let entry = PathEntry::from(item);
        assert!(entry.has_children);
        let sensor_names: Vec<_> = entry
            .sensors
            .as_ref()
            .unwrap()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(sensor_names, vec!["Humidity Sensor", "Temperature Sensor"]);
    }

    #[test]
    fn test_entry_json_shape() {
        let store = MemoryStore::from_seed(SeedData::bootstrap()).unwrap();
        let node = store.find_node("node-3").unwrap().unwrap();
        let entry = PathEntry::from(TreeItem::folder(&store, node).unwrap());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "folder");
        assert_eq!(json["hasChildren"], false);
        assert!(json.get("parentId").is_none());
        assert_eq!(json["sensors"], serde_json::json!([]));
        assert_eq!(json["metadata"]["budget"], "$5M");
    }

    #[test]
    fn test_sort_entries_breaks_ties_by_id() {
        let mut entries = vec![
            PathEntry::from(Sensor::new("b", "Same", "n")),
            PathEntry::from(Sensor::new("a", "Same", "n")),
            PathEntry::from(Sensor::new("c", "Alpha", "n")),
        ];
        sort_entries(&mut entries);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
