//! WebSocket Message Types
//!
//! Every frame the server pushes is a JSON array of [`NameUpdate`] objects.
//! Clients send nothing meaningful; inbound text is ignored.

use serde::{Deserialize, Serialize};

/// One renamed node within a broadcast batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameUpdate {
    /// Node id
    pub id: String,
    /// Name after the rename
    pub new_name: String,
}

impl NameUpdate {
    pub fn new(id: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            new_name: new_name.into(),
        }
    }
}

/// Serialize a batch into the text payload shared by every subscriber
pub fn encode_batch(batch: &[NameUpdate]) -> serde_json::Result<String> {
    serde_json::to_string(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_is_json_array() {
        let batch = vec![
            NameUpdate::new("node-1", "Manufacturing (42)"),
            NameUpdate::new("node-2", "Logistics (17)"),
        ];
        let json = encode_batch(&batch).unwrap();
        assert_eq!(
            json,
            r#"[{"id":"node-1","newName":"Manufacturing (42)"},{"id":"node-2","newName":"Logistics (17)"}]"#
        );
    }

    #[test]
    fn test_name_update_deserialize() {
        let update: NameUpdate =
            serde_json::from_str(r#"{"id": "node-3", "newName": "R&D (11)"}"#).unwrap();
        assert_eq!(update, NameUpdate::new("node-3", "R&D (11)"));
    }
}
