pub mod actions;
pub mod batch;
pub mod builder;
pub mod conditions;
pub mod diff;
pub mod resolver;
pub mod validate;

pub use actions::{build_actions, ActionOutcome, Addition, Deletion, EditAction, Update};
pub use batch::{BatchEditor, BatchReport, Preview};
pub use builder::build_from_path;
pub use conditions::{evaluate, CompiledCondition, CompiledMatcher};
pub use diff::{diff_and_validate_records, diff_records};
pub use resolver::{collect_leaves, node_at, node_at_mut, Step, TargetPath};
pub use validate::RecordValidator;
