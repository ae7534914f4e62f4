use std::collections::BTreeMap;

use anyhow::Result;
use parking_lot::RwLock;
use serde_json::Value;

use crate::model::{Id, SchemaNode};
use crate::store::traits::{QueryStore, RecordPage, RecordStore, SchemaStore, Store};

/// In-memory store standing in for the search and persistence collaborators.
///
/// Queries are a naive case-insensitive substring scan over each record's
/// serialized form; an empty query matches everything. BTreeMaps keep id
/// ordering stable across runs.
#[derive(Default)]
pub struct MemoryStore {
    schemas: RwLock<BTreeMap<String, SchemaNode>>,
    records: RwLock<BTreeMap<Id, StoredRecord>>,
}

struct StoredRecord {
    index: String,
    document: Value,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_schema(&self, index: impl Into<String>, schema: SchemaNode) {
        self.schemas.write().insert(index.into(), schema);
    }

    pub fn insert_record(&self, id: impl Into<Id>, index: impl Into<String>, document: Value) {
        self.records.write().insert(
            id.into(),
            StoredRecord {
                index: index.into(),
                document,
            },
        );
    }

    fn matching_ids(&self, query: &str, index: &str) -> Vec<Id> {
        let needle = query.to_lowercase();
        self.records
            .read()
            .iter()
            .filter(|(_, stored)| stored.index == index)
            .filter(|(_, stored)| {
                needle.is_empty() || stored.document.to_string().to_lowercase().contains(&needle)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl SchemaStore for MemoryStore {
    async fn load_schema(&self, index: &str) -> Result<Option<SchemaNode>> {
        Ok(self.schemas.read().get(index).cloned())
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn get_record(&self, id: &Id) -> Result<Option<Value>> {
        Ok(self
            .records
            .read()
            .get(id)
            .map(|stored| stored.document.clone()))
    }

    async fn save_record(&self, id: &Id, record: Value) -> Result<()> {
        if let Some(stored) = self.records.write().get_mut(id) {
            stored.document = record;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl QueryStore for MemoryStore {
    async fn resolve_query(&self, query: &str, index: &str) -> Result<Vec<Id>> {
        Ok(self.matching_ids(query, index))
    }

    async fn fetch_page(
        &self,
        query: &str,
        page_size: usize,
        page_num: usize,
        index: &str,
    ) -> Result<RecordPage> {
        let ids = self.matching_ids(query, index);
        let total_records = ids.len();
        let start = page_size * page_num.saturating_sub(1);
        let records = self.records.read();
        let documents = ids
            .iter()
            .skip(start)
            .take(page_size)
            .filter_map(|id| records.get(id).map(|stored| stored.document.clone()))
            .collect();
        Ok(RecordPage {
            documents,
            total_records,
        })
    }
}

impl Store for MemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_record("1", "literature", json!({"titles": [{"title": "gravity"}]}));
        store.insert_record("2", "literature", json!({"titles": [{"title": "quarks"}]}));
        store.insert_record("3", "authors", json!({"full_name": "Maldacena"}));
        store
    }

    #[tokio::test]
    async fn queries_are_scoped_to_their_index() {
        let ids = store().resolve_query("", "literature").await.unwrap();
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn query_text_narrows_matches() {
        let ids = store().resolve_query("quarks", "literature").await.unwrap();
        assert_eq!(ids, vec!["2".to_string()]);
    }

    #[tokio::test]
    async fn pages_are_one_based() {
        let page = store().fetch_page("", 1, 2, "literature").await.unwrap();
        assert_eq!(page.total_records, 2);
        assert_eq!(page.documents, vec![json!({"titles": [{"title": "quarks"}]})]);
    }
}
