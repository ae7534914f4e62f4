use serde_json::{json, Value};

use crate::model::SchemaNode;

/// Synthesize the minimal structure a keypath requires, holding `value` at
/// its leaf.
///
/// Array-typed levels wrap exactly one element and object-typed levels wrap
/// a single field, so `authors.affiliations.value` becomes
/// `{"authors": [{"affiliations": [{"value": ...}]}]}`. Newly created arrays
/// are never empty.
pub fn build_from_path(schema: &SchemaNode, keypath: &[String], value: &Value) -> Value {
    match schema {
        SchemaNode::Array { items } => {
            Value::Array(vec![build_from_path(items, keypath, value)])
        }
        _ => match keypath.split_first() {
            None => value.clone(),
            Some((segment, rest)) => {
                let inner = match schema.property(segment) {
                    Some(child) => build_from_path(child, rest, value),
                    // Keypaths are validated against the schema before any
                    // build, so this arm only pads malformed descriptors.
                    None => value.clone(),
                };
                json!({ segment: inner })
            }
        },
    }
}
