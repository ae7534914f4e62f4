use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Id;

/// What happened to a single field position between the original and the
/// mutated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

/// One field-level change descriptor, dotted path with array indices
/// (e.g. `authors.0.affiliations.1.value`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub kind: ChangeKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Either the position of a record within a preview batch or its persistent
/// identifier during a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordRef {
    Index(usize),
    Id(Id),
}

/// A per-record failure that does not abort the rest of the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordError {
    pub record: RecordRef,
    pub message: String,
}

impl RecordError {
    pub fn at_index(index: usize, message: impl Into<String>) -> Self {
        Self {
            record: RecordRef::Index(index),
            message: message.into(),
        }
    }

    pub fn for_id(id: impl Into<Id>, message: impl Into<String>) -> Self {
        Self {
            record: RecordRef::Id(id.into()),
            message: message.into(),
        }
    }
}
