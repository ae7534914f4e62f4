use std::collections::HashMap;

use serde_json::Value;

use crate::error::EditorError;

/// Scalar kinds a schema leaf can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl SchemaKind {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
        }
    }
}

/// A resolved schema descriptor node.
///
/// The engine branches on this tagged shape instead of inspecting record
/// values at runtime: objects consume one keypath segment, arrays are
/// transparent (they fan out without consuming a segment), scalars terminate.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object {
        properties: HashMap<String, SchemaNode>,
        required: Vec<String>,
    },
    Array {
        items: Box<SchemaNode>,
    },
    Scalar(SchemaKind),
}

impl SchemaNode {
    /// Parse a resolved JSON-Schema-like descriptor. References must already
    /// be expanded; `$ref` here is an ordinary property name, not a pointer.
    pub fn from_value(descriptor: &Value) -> Result<Self, EditorError> {
        let obj = descriptor
            .as_object()
            .ok_or_else(|| EditorError::InvalidSchema("descriptor node is not an object".into()))?;

        let declared = obj.get("type").and_then(Value::as_str);
        match declared {
            Some("object") if obj.contains_key("properties") => {
                let mut properties = HashMap::new();
                if let Some(props) = obj.get("properties").and_then(Value::as_object) {
                    for (name, child) in props {
                        // Loose descriptors sometimes carry stray scalar keys
                        // next to real property definitions; skip those.
                        if child.is_object() {
                            properties.insert(name.clone(), SchemaNode::from_value(child)?);
                        }
                    }
                }
                let required = obj
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|names| {
                        names
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(SchemaNode::Object {
                    properties,
                    required,
                })
            }
            Some("object") => Ok(SchemaNode::Object {
                properties: HashMap::new(),
                required: Vec::new(),
            }),
            Some("array") => {
                let items = obj.get("items").ok_or_else(|| {
                    EditorError::InvalidSchema("array descriptor without items".into())
                })?;
                Ok(SchemaNode::Array {
                    items: Box::new(SchemaNode::from_value(items)?),
                })
            }
            Some("string") => Ok(SchemaNode::Scalar(SchemaKind::String)),
            Some("number") => Ok(SchemaNode::Scalar(SchemaKind::Number)),
            Some("integer") => Ok(SchemaNode::Scalar(SchemaKind::Integer)),
            Some("boolean") => Ok(SchemaNode::Scalar(SchemaKind::Boolean)),
            Some(other) => Err(EditorError::InvalidSchema(format!(
                "unsupported type '{}'",
                other
            ))),
            None => Err(EditorError::InvalidSchema(
                "descriptor node without a type".into(),
            )),
        }
    }

    /// Look up a named property, descending through array levels first since
    /// they do not consume keypath segments.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        match self.through_arrays() {
            SchemaNode::Object { properties, .. } => properties.get(name),
            _ => None,
        }
    }

    /// Skip any number of array wrappers and return the element schema.
    pub fn through_arrays(&self) -> &SchemaNode {
        let mut node = self;
        while let SchemaNode::Array { items } = node {
            node = items;
        }
        node
    }

    /// Walk a full keypath, array levels transparent, and return the schema
    /// node the path terminates at. Any segment the schema does not declare
    /// is a usage error.
    pub fn resolve_path(&self, keypath: &[String]) -> Result<&SchemaNode, EditorError> {
        let mut node = self;
        for (i, segment) in keypath.iter().enumerate() {
            node = node
                .property(segment)
                .ok_or_else(|| EditorError::UnknownField {
                    path: keypath[..=i].join("."),
                })?;
        }
        Ok(node)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SchemaNode::Array { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Object { .. } => "object",
            SchemaNode::Array { .. } => "array",
            SchemaNode::Scalar(kind) => kind.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> Value {
        json!({
            "type": "object",
            "properties": {
                "titles": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "subtitle": {"type": "string"}
                        },
                        "required": ["title"]
                    }
                },
                "core": {"type": "boolean"}
            }
        })
    }

    #[test]
    fn parses_nested_descriptor() {
        let schema = SchemaNode::from_value(&descriptor()).unwrap();
        let titles = schema.property("titles").unwrap();
        assert!(titles.is_array());
        assert_eq!(
            titles.property("title"),
            Some(&SchemaNode::Scalar(SchemaKind::String))
        );
    }

    #[test]
    fn resolve_path_crosses_array_levels() {
        let schema = SchemaNode::from_value(&descriptor()).unwrap();
        let leaf = schema
            .resolve_path(&["titles".into(), "subtitle".into()])
            .unwrap();
        assert_eq!(leaf, &SchemaNode::Scalar(SchemaKind::String));
    }

    #[test]
    fn unknown_segment_is_a_usage_error() {
        let schema = SchemaNode::from_value(&descriptor()).unwrap();
        let err = schema
            .resolve_path(&["titles".into(), "publisher".into()])
            .unwrap_err();
        assert!(matches!(err, EditorError::UnknownField { path } if path == "titles.publisher"));
    }
}
