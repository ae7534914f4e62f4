use itertools::Itertools;
use serde_json::Value;

use crate::logic::validate::RecordValidator;
use crate::model::{ChangeKind, FieldChange, RecordError, SchemaNode};

/// Structural comparison of one record before and after mutation.
///
/// Changes are reported at the deepest position that differs; array elements
/// compare index by index, so an appended element shows up as a single
/// `added` entry at its index.
pub fn diff_records(original: &Value, mutated: &Value) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    if original != mutated {
        descend(original, mutated, &mut Vec::new(), &mut changes);
    }
    changes
}

fn descend(original: &Value, mutated: &Value, path: &mut Vec<String>, out: &mut Vec<FieldChange>) {
    match (original, mutated) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, old_value) in old {
                path.push(key.clone());
                match new.get(key) {
                    Some(new_value) if old_value != new_value => {
                        descend(old_value, new_value, path, out)
                    }
                    Some(_) => {}
                    None => out.push(change(ChangeKind::Removed, path, Some(old_value), None)),
                }
                path.pop();
            }
            for (key, new_value) in new {
                if !old.contains_key(key) {
                    path.push(key.clone());
                    out.push(change(ChangeKind::Added, path, None, Some(new_value)));
                    path.pop();
                }
            }
        }
        (Value::Array(old), Value::Array(new)) => {
            for i in 0..old.len().min(new.len()) {
                if old[i] != new[i] {
                    path.push(i.to_string());
                    descend(&old[i], &new[i], path, out);
                    path.pop();
                }
            }
            for (i, old_value) in old.iter().enumerate().skip(new.len()) {
                path.push(i.to_string());
                out.push(change(ChangeKind::Removed, path, Some(old_value), None));
                path.pop();
            }
            for (i, new_value) in new.iter().enumerate().skip(old.len()) {
                path.push(i.to_string());
                out.push(change(ChangeKind::Added, path, None, Some(new_value)));
                path.pop();
            }
        }
        _ => out.push(change(
            ChangeKind::Changed,
            path,
            Some(original),
            Some(mutated),
        )),
    }
}

fn change(
    kind: ChangeKind,
    path: &[String],
    old_value: Option<&Value>,
    new_value: Option<&Value>,
) -> FieldChange {
    FieldChange {
        kind,
        path: path.iter().join("."),
        old_value: old_value.cloned(),
        new_value: new_value.cloned(),
    }
}

/// Per-record diffs plus validation errors for a whole batch, index-aligned
/// on the diff side. A record that fails validation gets one error entry and
/// never blocks its siblings.
pub fn diff_and_validate_records(
    original_records: &[Value],
    mutated_records: &[Value],
    schema: &SchemaNode,
) -> (Vec<Vec<FieldChange>>, Vec<RecordError>) {
    let mut diffs = Vec::with_capacity(mutated_records.len());
    let mut errors = Vec::new();
    for (index, (original, mutated)) in original_records
        .iter()
        .zip(mutated_records)
        .enumerate()
    {
        diffs.push(diff_records(original, mutated));
        let problems = RecordValidator::validate(schema, mutated);
        if !problems.is_empty() {
            errors.push(RecordError::at_index(index, problems.iter().join("; ")));
        }
    }
    (diffs, errors)
}
