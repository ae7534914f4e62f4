use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a candidate value is compared against the user-supplied text.
///
/// All comparisons are case-insensitive; `Regex` compiles case-insensitive
/// and must match the whole value, not a substring of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Contains,
    Regex,
    Missing,
}

/// A boolean predicate anchored at some keypath of the record under edit.
///
/// `missing` asks whether the path resolves to nothing at all (absent field,
/// empty array, or a trailing field absent from every fanned-out element);
/// every other match type asks whether any fanned-out value matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub keypath: Vec<String>,
    pub match_type: MatchType,
    #[serde(default)]
    pub value: String,
}

/// One edit requested by the operator, as posted by the editor UI.
///
/// Actions are constructed per request, applied once per target record in
/// the order supplied, and hold no state across records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "lowercase")]
pub enum UserAction {
    Addition {
        keypath: Vec<String>,
        /// Scalar or nested object literal to insert.
        value: Value,
        #[serde(default)]
        conditions: Vec<Condition>,
    },
    Deletion {
        keypath: Vec<String>,
        match_type: MatchType,
        /// Values matching this text are removed.
        update_value: String,
        #[serde(default)]
        conditions: Vec<Condition>,
    },
    Update {
        keypath: Vec<String>,
        match_type: MatchType,
        /// Values matching this text are replaced.
        update_value: String,
        /// Replacement, coerced to the schema kind of the target field.
        value: String,
        #[serde(default)]
        conditions: Vec<Condition>,
    },
}
