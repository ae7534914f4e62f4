use crate::model::Id;
use thiserror::Error;

/// Failure taxonomy for the editor engine.
///
/// `UnknownField` and `InvalidRegex` are usage errors: the request itself is
/// malformed and the whole invocation is rejected. Validation failures are
/// never surfaced through this type; they are collected per record so one
/// bad record cannot abort a batch.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("field '{path}' is not present in the schema")]
    UnknownField { path: String },

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("query matched {total} records, exceeding the limit of {limit}")]
    TooManyRecords { total: usize, limit: usize },

    #[error("the search snapshot has expired, run the search again")]
    SnapshotExpired,

    #[error("no search has been performed for this session")]
    NoSearchSession,

    #[error("no schema registered for index '{0}'")]
    SchemaNotFound(String),

    #[error("record '{0}' does not exist")]
    RecordNotFound(Id),

    #[error("invalid schema descriptor: {0}")]
    InvalidSchema(String),
}
