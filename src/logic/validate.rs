use serde_json::Value;

use crate::model::{SchemaKind, SchemaNode};

/// Schema validation for mutated records.
///
/// Checks shape (object/array), scalar kinds, unknown fields, and required
/// fields. Returns human-readable messages; an empty list means the record
/// conforms.
pub struct RecordValidator;

impl RecordValidator {
    pub fn validate(schema: &SchemaNode, record: &Value) -> Vec<String> {
        let mut errors = Vec::new();
        Self::validate_node(schema, record, &mut Vec::new(), &mut errors);
        errors
    }

    fn validate_node(
        schema: &SchemaNode,
        node: &Value,
        path: &mut Vec<String>,
        errors: &mut Vec<String>,
    ) {
        match schema {
            SchemaNode::Object {
                properties,
                required,
            } => {
                let Value::Object(map) = node else {
                    errors.push(Self::mismatch("object", node, path));
                    return;
                };
                for name in required {
                    if !map.contains_key(name) {
                        errors.push(format!(
                            "missing required field '{}' at {}",
                            name,
                            Self::location(path)
                        ));
                    }
                }
                for (name, value) in map {
                    match properties.get(name) {
                        Some(child_schema) => {
                            path.push(name.clone());
                            Self::validate_node(child_schema, value, path, errors);
                            path.pop();
                        }
                        None => errors.push(format!(
                            "unexpected field '{}' at {}",
                            name,
                            Self::location(path)
                        )),
                    }
                }
            }
            SchemaNode::Array { items } => {
                let Value::Array(elements) = node else {
                    errors.push(Self::mismatch("array", node, path));
                    return;
                };
                for (i, element) in elements.iter().enumerate() {
                    path.push(i.to_string());
                    Self::validate_node(items, element, path, errors);
                    path.pop();
                }
            }
            SchemaNode::Scalar(kind) => {
                let ok = match kind {
                    SchemaKind::String => node.is_string(),
                    SchemaKind::Boolean => node.is_boolean(),
                    SchemaKind::Number => node.is_number(),
                    SchemaKind::Integer => node.is_i64() || node.is_u64(),
                };
                if !ok {
                    errors.push(Self::mismatch(kind.name(), node, path));
                }
            }
        }
    }

    fn mismatch(expected: &str, found: &Value, path: &[String]) -> String {
        let found = match found {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        format!(
            "expected {} at {}, found {}",
            expected,
            Self::location(path),
            found
        )
    }

    fn location(path: &[String]) -> String {
        if path.is_empty() {
            "record root".to_string()
        } else {
            format!("'{}'", path.join("."))
        }
    }
}
