use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::EditorError;
use crate::logic::resolver;
use crate::model::{Condition, MatchType, SchemaNode};

/// Text form a record value is compared under. Booleans and numbers take
/// their literal spelling so `"True"` matches `true` case-insensitively.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A match predicate with its pattern compiled once per action application.
#[derive(Debug, Clone)]
pub enum CompiledMatcher {
    Exact(String),
    Contains(String),
    Regex(Regex),
    /// Matches no existing value; handled by the caller as an absence test.
    Missing,
}

impl CompiledMatcher {
    pub fn new(match_type: MatchType, expected: &str) -> Result<Self, EditorError> {
        match match_type {
            MatchType::Exact => Ok(CompiledMatcher::Exact(expected.to_lowercase())),
            MatchType::Contains => Ok(CompiledMatcher::Contains(expected.to_lowercase())),
            MatchType::Regex => {
                // Anchored: the pattern must cover the whole value.
                let regex = RegexBuilder::new(&format!("^(?:{})$", expected))
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| EditorError::InvalidRegex {
                        pattern: expected.to_string(),
                        source,
                    })?;
                Ok(CompiledMatcher::Regex(regex))
            }
            MatchType::Missing => Ok(CompiledMatcher::Missing),
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        let text = value_text(value);
        match self {
            CompiledMatcher::Exact(expected) => text.to_lowercase() == *expected,
            CompiledMatcher::Contains(expected) => text.to_lowercase().contains(expected),
            CompiledMatcher::Regex(regex) => regex.is_match(&text),
            CompiledMatcher::Missing => false,
        }
    }
}

/// A condition bound to the action keypath it travels with.
///
/// `anchor` is the length of the longest common prefix between the condition
/// keypath and the action keypath. The action traversal evaluates the
/// condition at every node it reaches by consuming exactly `anchor`
/// segments, so a condition sharing an array-crossing prefix gates each
/// fanned-out branch independently, while a disjoint condition (anchor 0)
/// gates the whole record at the root.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    pub keypath: Vec<String>,
    pub anchor: usize,
    matcher: CompiledMatcher,
    missing: bool,
}

impl CompiledCondition {
    pub fn compile(
        condition: &Condition,
        action_keypath: &[String],
        schema: &SchemaNode,
    ) -> Result<Self, EditorError> {
        schema.resolve_path(&condition.keypath)?;
        let anchor = condition
            .keypath
            .iter()
            .zip(action_keypath)
            .take_while(|(a, b)| a == b)
            .count();
        Ok(Self {
            keypath: condition.keypath.clone(),
            anchor,
            matcher: CompiledMatcher::new(condition.match_type, &condition.value)?,
            missing: condition.match_type == MatchType::Missing,
        })
    }

    /// Evaluate this condition scoped to `node`, a position reached by
    /// consuming `depth` segments of the action keypath (`depth <= anchor`).
    /// Quantification over the remaining fan-out is "any match exists";
    /// `missing` is its negation.
    pub fn holds_at(&self, schema: &SchemaNode, node: &Value, depth: usize) -> bool {
        let remaining = &self.keypath[depth..];
        let leaves = resolver::collect_leaves(schema, node, remaining);
        if self.missing {
            leaves.is_empty()
        } else {
            leaves.iter().any(|(_, value)| self.matcher.matches(value))
        }
    }
}

/// Evaluate a condition set against a whole record: the logical AND of all
/// conditions, each quantified over its own fan-out from the root.
pub fn evaluate(
    schema: &SchemaNode,
    record: &Value,
    conditions: &[Condition],
) -> Result<bool, EditorError> {
    for condition in conditions {
        let compiled = CompiledCondition::compile(condition, &[], schema)?;
        if !compiled.holds_at(schema, record, 0) {
            return Ok(false);
        }
    }
    Ok(true)
}
