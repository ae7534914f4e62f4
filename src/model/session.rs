use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Id;

/// The record identifiers captured by the most recent search.
///
/// A batch edit is only allowed to touch records that were part of the
/// search it was previewed against, so the id set is snapshotted once when
/// the search runs and passed along explicitly. Concurrent index updates
/// during a long-running batch therefore cannot change which records the
/// edit applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub ids: Vec<Id>,
    /// Index (and thereby schema) the search ran against.
    pub index: String,
    pub created_at: DateTime<Utc>,
}

impl SearchSnapshot {
    pub fn new(ids: Vec<Id>, index: impl Into<String>) -> Self {
        Self {
            ids,
            index: index.into(),
            created_at: Utc::now(),
        }
    }

    /// Narrow the snapshot to the records the operator selected in the UI.
    ///
    /// With `all_selected` the picked ids are the records to *exclude*;
    /// otherwise they are the records to keep. Snapshot order is preserved
    /// either way.
    pub fn select(&self, all_selected: bool, picked: &[Id]) -> Vec<Id> {
        if all_selected {
            self.ids
                .iter()
                .filter(|id| !picked.contains(*id))
                .cloned()
                .collect()
        } else {
            self.ids
                .iter()
                .filter(|id| picked.contains(*id))
                .cloned()
                .collect()
        }
    }

    pub fn is_expired(&self, ttl_minutes: i64) -> bool {
        Utc::now() - self.created_at > Duration::minutes(ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SearchSnapshot {
        SearchSnapshot::new(
            vec!["1".into(), "2".into(), "3".into(), "4".into()],
            "literature",
        )
    }

    #[test]
    fn select_keeps_picked_ids_in_snapshot_order() {
        let ids = snapshot().select(false, &["3".into(), "1".into()]);
        assert_eq!(ids, vec!["1".to_string(), "3".to_string()]);
    }

    #[test]
    fn select_all_excludes_picked_ids() {
        let ids = snapshot().select(true, &["2".into()]);
        assert_eq!(ids, vec!["1".to_string(), "3".to_string(), "4".to_string()]);
    }

    #[test]
    fn fresh_snapshot_is_not_expired() {
        assert!(!snapshot().is_expired(60));
    }
}
