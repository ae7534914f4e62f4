use anyhow::Result;
use serde_json::Value;

use crate::model::{Id, SchemaNode};

/// One page of query results, as handed over by the search layer.
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub documents: Vec<Value>,
    pub total_records: usize,
}

/// Source of resolved schema descriptors, one per searchable index.
#[async_trait::async_trait]
pub trait SchemaStore: Send + Sync {
    async fn load_schema(&self, index: &str) -> Result<Option<SchemaNode>>;
}

/// Record persistence. The batch driver calls this once per record per
/// commit; the patch algorithms themselves never touch it.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_record(&self, id: &Id) -> Result<Option<Value>>;
    async fn save_record(&self, id: &Id, record: Value) -> Result<()>;
}

/// The search layer the engine delegates record selection to. The engine
/// only ever sees resolved id lists and fetched documents, never the query
/// protocol itself.
#[async_trait::async_trait]
pub trait QueryStore: Send + Sync {
    /// Resolve a query to the ordered ids of every matching record.
    async fn resolve_query(&self, query: &str, index: &str) -> Result<Vec<Id>>;
    /// Fetch one page of matching documents; `page_num` is 1-based.
    async fn fetch_page(
        &self,
        query: &str,
        page_size: usize,
        page_num: usize,
        index: &str,
    ) -> Result<RecordPage>;
}

pub trait Store: SchemaStore + RecordStore + QueryStore + Send + Sync {}
