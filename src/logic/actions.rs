use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::EditorError;
use crate::logic::builder;
use crate::logic::conditions::{CompiledCondition, CompiledMatcher};
use crate::logic::resolver::{self, Step, TargetPath};
use crate::model::{Condition, MatchType, SchemaKind, SchemaNode, UserAction};

/// What one action did to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The record was mutated at this many positions.
    Applied { targets: usize },
    /// A condition ruled out every candidate position.
    Skipped,
    /// Nothing matched; the record is untouched and this is not an error.
    NoOp,
}

/// The three mutation kinds share traversal and conditions and differ only
/// in their effect at the resolved positions.
pub trait EditAction: Send + Sync {
    fn apply(&self, record: &mut Value, schema: &SchemaNode) -> Result<ActionOutcome, EditorError>;
}

/// Insert `value` at every position the keypath fans out to, creating
/// intermediate containers that do not exist yet. Absence is the trigger for
/// creation, never a failure.
#[derive(Debug, Clone)]
pub struct Addition {
    pub keypath: Vec<String>,
    pub value: Value,
    pub conditions: Vec<Condition>,
}

/// Remove every resolved value matching `update_value`, pruning containers
/// the removal empties.
#[derive(Debug, Clone)]
pub struct Deletion {
    pub keypath: Vec<String>,
    pub match_type: MatchType,
    pub update_value: String,
    pub conditions: Vec<Condition>,
}

/// Replace every resolved value matching `update_value` with `value`,
/// coerced to the schema kind of the target field.
#[derive(Debug, Clone)]
pub struct Update {
    pub keypath: Vec<String>,
    pub match_type: MatchType,
    pub update_value: String,
    pub value: String,
    pub conditions: Vec<Condition>,
}

/// Lower wire-format actions into their engine implementations.
pub fn build_actions(user_actions: &[UserAction]) -> Vec<Box<dyn EditAction>> {
    user_actions.iter().cloned().map(into_action).collect()
}

fn into_action(action: UserAction) -> Box<dyn EditAction> {
    match action {
        UserAction::Addition {
            keypath,
            value,
            conditions,
        } => Box::new(Addition {
            keypath,
            value,
            conditions,
        }),
        UserAction::Deletion {
            keypath,
            match_type,
            update_value,
            conditions,
        } => Box::new(Deletion {
            keypath,
            match_type,
            update_value,
            conditions,
        }),
        UserAction::Update {
            keypath,
            match_type,
            update_value,
            value,
            conditions,
        } => Box::new(Update {
            keypath,
            match_type,
            update_value,
            value,
            conditions,
        }),
    }
}

impl EditAction for Addition {
    fn apply(&self, record: &mut Value, schema: &SchemaNode) -> Result<ActionOutcome, EditorError> {
        schema.resolve_path(&self.keypath)?;
        let conditions = compile_conditions(&self.conditions, &self.keypath, schema)?;
        let mut walk = TargetWalk::new(&self.keypath, &conditions);
        let mut targets = Vec::new();
        walk.collect_write(schema, record, 0, &mut Vec::new(), &self.value, &mut targets);

        let mut applied = 0;
        for target in targets {
            applied += apply_write(record, target, &self.value);
        }
        Ok(outcome(applied, walk.blocked))
    }
}

impl EditAction for Deletion {
    fn apply(&self, record: &mut Value, schema: &SchemaNode) -> Result<ActionOutcome, EditorError> {
        schema.resolve_path(&self.keypath)?;
        let conditions = compile_conditions(&self.conditions, &self.keypath, schema)?;
        let matcher = CompiledMatcher::new(self.match_type, &self.update_value)?;
        let mut walk = TargetWalk::new(&self.keypath, &conditions);
        let mut targets = Vec::new();
        walk.collect_read(schema, record, 0, &mut Vec::new(), &matcher, &mut targets);

        // First pass collected owned positions; remove object fields, then
        // sequence elements in reverse-index order so nothing shifts under
        // the remaining removals.
        let mut element_hits: HashMap<TargetPath, Vec<usize>> = HashMap::new();
        let mut field_hits: Vec<(TargetPath, String)> = Vec::new();
        for mut target in targets {
            match target.pop() {
                Some(Step::Index(i)) => element_hits.entry(target).or_default().push(i),
                Some(Step::Field(name)) => field_hits.push((target, name)),
                None => {}
            }
        }

        let mut removed = 0;
        let mut emptied = Vec::new();
        for (parent, field) in field_hits {
            if let Some(Value::Object(map)) = resolver::node_at_mut(record, &parent) {
                if map.remove(&field).is_some() {
                    removed += 1;
                    emptied.push(parent);
                }
            }
        }
        for (parent, mut indices) in element_hits {
            if let Some(Value::Array(elements)) = resolver::node_at_mut(record, &parent) {
                indices.sort_unstable();
                indices.dedup();
                for i in indices.iter().rev() {
                    if *i < elements.len() {
                        elements.remove(*i);
                        removed += 1;
                    }
                }
                emptied.push(parent);
            }
        }
        if removed > 0 {
            prune_emptied(record, emptied);
        }
        Ok(outcome(removed, walk.blocked))
    }
}

impl EditAction for Update {
    fn apply(&self, record: &mut Value, schema: &SchemaNode) -> Result<ActionOutcome, EditorError> {
        let leaf = schema.resolve_path(&self.keypath)?.through_arrays();
        let conditions = compile_conditions(&self.conditions, &self.keypath, schema)?;
        let matcher = CompiledMatcher::new(self.match_type, &self.update_value)?;
        let mut walk = TargetWalk::new(&self.keypath, &conditions);
        let mut targets = Vec::new();
        walk.collect_read(schema, record, 0, &mut Vec::new(), &matcher, &mut targets);

        let replacement = coerce_to_kind(&self.value, leaf);
        let mut replaced = 0;
        for target in &targets {
            if let Some(slot) = resolver::node_at_mut(record, target) {
                *slot = replacement.clone();
                replaced += 1;
            }
        }
        Ok(outcome(replaced, walk.blocked))
    }
}

fn outcome(applied: usize, blocked: bool) -> ActionOutcome {
    if applied > 0 {
        ActionOutcome::Applied { targets: applied }
    } else if blocked {
        ActionOutcome::Skipped
    } else {
        ActionOutcome::NoOp
    }
}

fn compile_conditions(
    conditions: &[Condition],
    action_keypath: &[String],
    schema: &SchemaNode,
) -> Result<Vec<CompiledCondition>, EditorError> {
    conditions
        .iter()
        .map(|c| CompiledCondition::compile(c, action_keypath, schema))
        .collect()
}

/// A position an Addition will mutate, resolved before any mutation runs.
#[derive(Debug)]
enum WriteTarget {
    /// Keypath exhausted on an existing sequence: push the value.
    Append(TargetPath),
    /// Keypath exhausted on an existing object with an object literal:
    /// existing keys are preserved, new keys are added.
    Merge(TargetPath),
    /// Keypath exhausted on an existing scalar slot: overwrite it.
    Replace(TargetPath),
    /// The path stops existing here: attach a freshly built subtree.
    Attach { parent: TargetPath, built: Value },
}

/// Schema-directed traversal shared by all three actions.
///
/// Each compiled condition is evaluated at every node reached by consuming
/// exactly `anchor` segments of the action keypath, so conditions sharing an
/// array-crossing prefix with the keypath gate each fanned-out branch on its
/// own. `blocked` records whether any branch was ruled out this way.
struct TargetWalk<'a> {
    keypath: &'a [String],
    conditions: &'a [CompiledCondition],
    blocked: bool,
}

impl<'a> TargetWalk<'a> {
    fn new(keypath: &'a [String], conditions: &'a [CompiledCondition]) -> Self {
        Self {
            keypath,
            conditions,
            blocked: false,
        }
    }

    /// Conditions anchored exactly at `depth`, scoped to `node`.
    fn anchored_hold(&mut self, schema: &SchemaNode, node: &Value, depth: usize) -> bool {
        let conditions = self.conditions;
        for condition in conditions.iter().filter(|c| c.anchor == depth) {
            if !condition.holds_at(schema, node, depth) {
                self.blocked = true;
                return false;
            }
        }
        true
    }

    /// Conditions anchored at `min_anchor` or deeper, evaluated from the
    /// last node the record actually contains.
    fn pending_hold(
        &mut self,
        schema: &SchemaNode,
        node: &Value,
        depth: usize,
        min_anchor: usize,
    ) -> bool {
        let conditions = self.conditions;
        for condition in conditions.iter().filter(|c| c.anchor >= min_anchor) {
            if !condition.holds_at(schema, node, depth) {
                self.blocked = true;
                return false;
            }
        }
        true
    }

    fn collect_read(
        &mut self,
        schema: &SchemaNode,
        node: &Value,
        depth: usize,
        path: &mut TargetPath,
        matcher: &CompiledMatcher,
        out: &mut Vec<TargetPath>,
    ) {
        match schema {
            SchemaNode::Array { items } => {
                if let Value::Array(elements) = node {
                    for (i, element) in elements.iter().enumerate() {
                        path.push(Step::Index(i));
                        self.collect_read(items, element, depth, path, matcher, out);
                        path.pop();
                    }
                }
            }
            _ => {
                if !self.anchored_hold(schema, node, depth) {
                    return;
                }
                if depth == self.keypath.len() {
                    if matcher.matches(node) {
                        out.push(path.clone());
                    }
                    return;
                }
                let segment = &self.keypath[depth];
                let (Some(child_schema), Value::Object(map)) = (schema.property(segment), node)
                else {
                    return;
                };
                if let Some(child) = map.get(segment) {
                    path.push(Step::Field(segment.clone()));
                    self.collect_read(child_schema, child, depth + 1, path, matcher, out);
                    path.pop();
                }
            }
        }
    }

    fn collect_write(
        &mut self,
        schema: &SchemaNode,
        node: &Value,
        depth: usize,
        path: &mut TargetPath,
        value: &Value,
        out: &mut Vec<WriteTarget>,
    ) {
        match schema {
            SchemaNode::Array { items } => {
                let Value::Array(elements) = node else { return };
                if depth == self.keypath.len() {
                    // Array nodes carry no checkpoint of their own, so the
                    // conditions still anchored here are settled now.
                    if self.pending_hold(schema, node, depth, depth) {
                        out.push(WriteTarget::Append(path.clone()));
                    }
                } else if elements.is_empty() {
                    if self.pending_hold(schema, node, depth, depth) {
                        out.push(WriteTarget::Attach {
                            parent: path.clone(),
                            built: builder::build_from_path(schema, &self.keypath[depth..], value),
                        });
                    }
                } else {
                    for (i, element) in elements.iter().enumerate() {
                        path.push(Step::Index(i));
                        self.collect_write(items, element, depth, path, value, out);
                        path.pop();
                    }
                }
            }
            _ => {
                if !self.anchored_hold(schema, node, depth) {
                    return;
                }
                if depth == self.keypath.len() {
                    let target = match (schema, node, value) {
                        (SchemaNode::Object { .. }, Value::Object(_), Value::Object(_)) => {
                            WriteTarget::Merge(path.clone())
                        }
                        _ => WriteTarget::Replace(path.clone()),
                    };
                    out.push(target);
                    return;
                }
                let segment = &self.keypath[depth];
                let Some(child_schema) = schema.property(segment) else {
                    return;
                };
                let Value::Object(map) = node else { return };
                match map.get(segment) {
                    Some(child) => {
                        path.push(Step::Field(segment.clone()));
                        self.collect_write(child_schema, child, depth + 1, path, value, out);
                        path.pop();
                    }
                    None => {
                        // Conditions anchored below the break-off point are
                        // judged from here; `missing` holds, the rest fail.
                        if self.pending_hold(schema, node, depth, depth + 1) {
                            out.push(WriteTarget::Attach {
                                parent: path.clone(),
                                built: builder::build_from_path(
                                    schema,
                                    &self.keypath[depth..],
                                    value,
                                ),
                            });
                        }
                    }
                }
            }
        }
    }
}

fn apply_write(record: &mut Value, target: WriteTarget, value: &Value) -> usize {
    match target {
        WriteTarget::Append(path) => {
            if let Some(Value::Array(elements)) = resolver::node_at_mut(record, &path) {
                elements.push(value.clone());
                return 1;
            }
        }
        WriteTarget::Merge(path) => {
            if let (Some(Value::Object(existing)), Value::Object(incoming)) =
                (resolver::node_at_mut(record, &path), value)
            {
                for (key, val) in incoming {
                    existing
                        .entry(key.clone())
                        .or_insert_with(|| val.clone());
                }
                return 1;
            }
        }
        WriteTarget::Replace(path) => {
            if let Some(slot) = resolver::node_at_mut(record, &path) {
                *slot = value.clone();
                return 1;
            }
        }
        WriteTarget::Attach { parent, built } => {
            if let Some(node) = resolver::node_at_mut(record, &parent) {
                match (node, built) {
                    (Value::Object(map), Value::Object(single)) => {
                        for (key, val) in single {
                            map.insert(key, val);
                        }
                        return 1;
                    }
                    (Value::Array(elements), Value::Array(fresh)) => {
                        elements.extend(fresh);
                        return 1;
                    }
                    _ => {}
                }
            }
        }
    }
    0
}

/// Remove containers the deletion emptied, cascading toward the root.
/// Deepest paths go first, and among siblings the higher index goes first,
/// so pending paths never point past a removal.
fn prune_emptied(record: &mut Value, mut work: Vec<TargetPath>) {
    while !work.is_empty() {
        work.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| cmp_steps(b, a)));
        work.dedup();
        let path = work.remove(0);
        if path.is_empty() {
            continue;
        }
        let is_empty = match resolver::node_at(record, &path) {
            Some(Value::Array(elements)) => elements.is_empty(),
            Some(Value::Object(map)) => map.is_empty(),
            _ => false,
        };
        if !is_empty {
            continue;
        }
        let (parent, last) = path.split_at(path.len() - 1);
        if let Some(container) = resolver::node_at_mut(record, parent) {
            match (container, &last[0]) {
                (Value::Object(map), Step::Field(name)) => {
                    map.remove(name);
                }
                (Value::Array(elements), Step::Index(i)) if *i < elements.len() => {
                    elements.remove(*i);
                }
                _ => continue,
            }
            work.push(parent.to_vec());
        }
    }
}

fn cmp_steps(a: &TargetPath, b: &TargetPath) -> std::cmp::Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = match (x, y) {
            (Step::Index(i), Step::Index(j)) => i.cmp(j),
            (Step::Field(f), Step::Field(g)) => f.cmp(g),
            (Step::Index(_), Step::Field(_)) => std::cmp::Ordering::Less,
            (Step::Field(_), Step::Index(_)) => std::cmp::Ordering::Greater,
        };
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn coerce_to_kind(text: &str, schema: &SchemaNode) -> Value {
    match schema {
        SchemaNode::Scalar(SchemaKind::Boolean) => match text.to_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        SchemaNode::Scalar(SchemaKind::Integer) | SchemaNode::Scalar(SchemaKind::Number) => {
            if let Ok(whole) = text.parse::<i64>() {
                Value::from(whole)
            } else if let Ok(real) = text.parse::<f64>() {
                serde_json::Number::from_f64(real)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(text.to_string()))
            } else {
                // Left as text; validation reports the mismatch per record.
                Value::String(text.to_string())
            }
        }
        _ => Value::String(text.to_string()),
    }
}
