pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export the engine surface
pub use error::EditorError;
pub use logic::{
    build_actions, diff_and_validate_records, diff_records, ActionOutcome, Addition, BatchEditor,
    BatchReport, Deletion, EditAction, Preview, RecordValidator, Update,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, QueryStore, RecordPage, RecordStore, SchemaStore, Store};
