use serde_json::Value;

use crate::model::SchemaNode;

/// One concrete navigation step into a record tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Field(String),
    Index(usize),
}

/// An owned location inside a record, usable after the borrow that produced
/// it has ended. Mutations collect these first and apply second, so array
/// fan-outs are never mutated while still being iterated.
pub type TargetPath = Vec<Step>;

/// Follow a concrete path to the node it designates, if it still exists.
pub fn node_at<'a>(root: &'a Value, path: &[Step]) -> Option<&'a Value> {
    let mut node = root;
    for step in path {
        node = match step {
            Step::Field(name) => node.as_object()?.get(name)?,
            Step::Index(i) => node.as_array()?.get(*i)?,
        };
    }
    Some(node)
}

pub fn node_at_mut<'a>(root: &'a mut Value, path: &[Step]) -> Option<&'a mut Value> {
    let mut node = root;
    for step in path {
        node = match step {
            Step::Field(name) => node.as_object_mut()?.get_mut(name)?,
            Step::Index(i) => node.as_array_mut()?.get_mut(*i)?,
        };
    }
    Some(node)
}

/// Resolve a keypath for reading: every existing leaf position the path fans
/// out to, in record order.
///
/// Array levels never consume a keypath segment; each element is visited
/// with the same remaining path. A keypath that is exhausted while the
/// schema still says array fans out once more, so the elements themselves
/// become the leaves. Absent fields and shape mismatches simply contribute
/// no leaves.
pub fn collect_leaves<'a>(
    schema: &SchemaNode,
    node: &'a Value,
    keypath: &[String],
) -> Vec<(TargetPath, &'a Value)> {
    let mut out = Vec::new();
    descend(schema, node, keypath, &mut Vec::new(), &mut out);
    out
}

fn descend<'a>(
    schema: &SchemaNode,
    node: &'a Value,
    keypath: &[String],
    path: &mut TargetPath,
    out: &mut Vec<(TargetPath, &'a Value)>,
) {
    match schema {
        SchemaNode::Array { items } => {
            if let Value::Array(elements) = node {
                for (i, element) in elements.iter().enumerate() {
                    path.push(Step::Index(i));
                    descend(items, element, keypath, path, out);
                    path.pop();
                }
            }
        }
        _ => match keypath.split_first() {
            None => out.push((path.clone(), node)),
            Some((segment, rest)) => {
                let (Some(child_schema), Value::Object(map)) = (schema.property(segment), node)
                else {
                    return;
                };
                if let Some(child) = map.get(segment) {
                    path.push(Step::Field(segment.clone()));
                    descend(child_schema, child, rest, path, out);
                    path.pop();
                }
            }
        },
    }
}
