//! Core record types held by the store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A folder-like tree entity. A node without `parent_id` is a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Node {
    /// Create a root node
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a node under `parent_id`
    pub fn child(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::root(id, name)
        }
    }

    /// Add a metadata attribute (builder pattern)
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A leaf instrument attached to exactly one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: String,
    pub name: String,
    /// Owning node
    pub node_id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Sensor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_id: node_id.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata attribute (builder pattern)
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Case-insensitive substring test used by every store search.
///
/// `needle` must already be lowercased.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub(crate) fn metadata_contains(metadata: &HashMap<String, String>, needle: &str) -> bool {
    metadata
        .values()
        .any(|value| contains_ignore_case(value, needle))
}

/// Record counts reported by the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub nodes: usize,
    pub sensors: usize,
}
