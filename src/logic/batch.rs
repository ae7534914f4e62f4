use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::logic::actions::{build_actions, ActionOutcome, EditAction};
use crate::logic::diff::diff_and_validate_records;
use crate::logic::validate::RecordValidator;
use crate::model::{FieldChange, Id, RecordError, SchemaNode, SearchSnapshot, UserAction};
use crate::store::Store;

/// Result of a dry run: nothing was persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    /// Records as they were fetched, untouched.
    pub original_records: Vec<Value>,
    /// Records after all actions, index-aligned with the originals.
    pub mutated_records: Vec<Value>,
    pub record_diffs: Vec<Vec<FieldChange>>,
    pub errors: Vec<RecordError>,
}

/// Summary of a persisted batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub updated: usize,
    /// Records left unchanged: conditions failed or nothing matched.
    pub skipped: usize,
    pub errors: Vec<RecordError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

enum CommitOutcome {
    Updated,
    Untouched,
    Missing,
    Invalid(String),
}

/// Applies a request's actions across many records.
///
/// Each record is a self-contained unit of work: actions run in the order
/// supplied, then the result is validated and either reported (preview) or
/// persisted (commit). No state is shared between records, so an outer
/// dispatcher may process chunks on parallel workers.
pub struct BatchEditor;

impl BatchEditor {
    /// Apply all actions in order to one record, in place.
    pub fn apply_actions(
        record: &mut Value,
        schema: &SchemaNode,
        actions: &[Box<dyn EditAction>],
    ) -> Result<Vec<ActionOutcome>, EditorError> {
        actions
            .iter()
            .map(|action| action.apply(record, schema))
            .collect()
    }

    /// Dry-run the actions over already-fetched documents: mutate snapshots,
    /// diff them against the originals, validate, persist nothing.
    pub fn preview(
        records: &[Value],
        schema: &SchemaNode,
        user_actions: &[UserAction],
    ) -> Result<Preview, EditorError> {
        let actions = build_actions(user_actions);
        let mut mutated = records.to_vec();
        for record in &mut mutated {
            Self::apply_actions(record, schema, &actions)?;
        }
        let (record_diffs, errors) = diff_and_validate_records(records, &mutated, schema);
        Ok(Preview {
            original_records: records.to_vec(),
            mutated_records: mutated,
            record_diffs,
            errors,
        })
    }

    /// Preview one page of search results, the way the editor UI pages
    /// through a pending edit.
    pub async fn preview_page<S>(
        store: &S,
        query: &str,
        page_size: usize,
        page_num: usize,
        index: &str,
        user_actions: &[UserAction],
    ) -> Result<Preview>
    where
        S: Store + ?Sized,
    {
        let schema = store
            .load_schema(index)
            .await?
            .ok_or_else(|| EditorError::SchemaNotFound(index.to_string()))?;
        let page = store.fetch_page(query, page_size, page_num, index).await?;
        Ok(Self::preview(&page.documents, &schema, user_actions)?)
    }

    /// Run the query and capture the matching ids once, before any batch
    /// work begins. Result sets over the configured ceiling are rejected
    /// here, request-level, exactly like an over-broad search.
    pub async fn snapshot_search<S>(
        store: &S,
        query: &str,
        index: &str,
        config: &EditorConfig,
    ) -> Result<SearchSnapshot>
    where
        S: Store + ?Sized,
    {
        let ids = store.resolve_query(query, index).await?;
        if ids.len() > config.max_records {
            return Err(EditorError::TooManyRecords {
                total: ids.len(),
                limit: config.max_records,
            }
            .into());
        }
        Ok(SearchSnapshot::new(ids, index))
    }

    /// Commit the actions to the records the operator selected from a
    /// search snapshot.
    pub async fn commit_selection<S>(
        store: &S,
        snapshot: &SearchSnapshot,
        all_selected: bool,
        picked: &[Id],
        user_actions: &[UserAction],
        config: &EditorConfig,
    ) -> Result<BatchReport>
    where
        S: Store + ?Sized,
    {
        if snapshot.is_expired(config.snapshot_ttl_minutes) {
            return Err(EditorError::SnapshotExpired.into());
        }
        let ids = snapshot.select(all_selected, picked);
        Self::commit(store, &ids, &snapshot.index, user_actions, config).await
    }

    /// Apply and persist, chunked so a worker failure loses at most one
    /// chunk's progress. A record that fails validation is reported and not
    /// saved; its siblings proceed. A keypath unknown to the schema is a
    /// usage error and aborts the whole run, since it would fail identically
    /// for every record.
    pub async fn commit<S>(
        store: &S,
        ids: &[Id],
        index: &str,
        user_actions: &[UserAction],
        config: &EditorConfig,
    ) -> Result<BatchReport>
    where
        S: Store + ?Sized,
    {
        if ids.len() > config.max_records {
            return Err(EditorError::TooManyRecords {
                total: ids.len(),
                limit: config.max_records,
            }
            .into());
        }
        let schema = store
            .load_schema(index)
            .await?
            .ok_or_else(|| EditorError::SchemaNotFound(index.to_string()))?;
        let actions = build_actions(user_actions);

        let started_at = Utc::now();
        let mut updated = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();
        let chunk_size = config.chunk_size.max(1);
        let chunks = ids.iter().chunks(chunk_size);
        for (chunk_no, chunk) in (&chunks).into_iter().enumerate() {
            let mut processed = 0;
            for id in chunk {
                processed += 1;
                match Self::commit_one(store, id, &schema, &actions).await? {
                    CommitOutcome::Updated => updated += 1,
                    CommitOutcome::Untouched => skipped += 1,
                    CommitOutcome::Missing => {
                        errors.push(RecordError::for_id(
                            id.clone(),
                            EditorError::RecordNotFound(id.clone()).to_string(),
                        ));
                    }
                    CommitOutcome::Invalid(message) => {
                        log::warn!("record {} failed validation: {}", id, message);
                        errors.push(RecordError::for_id(id.clone(), message));
                    }
                }
            }
            log::info!(
                "chunk {}: processed {} records ({} updated so far)",
                chunk_no,
                processed,
                updated
            );
        }

        Ok(BatchReport {
            updated,
            skipped,
            errors,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn commit_one<S>(
        store: &S,
        id: &Id,
        schema: &SchemaNode,
        actions: &[Box<dyn EditAction>],
    ) -> Result<CommitOutcome>
    where
        S: Store + ?Sized,
    {
        let Some(mut record) = store.get_record(id).await? else {
            return Ok(CommitOutcome::Missing);
        };
        let outcomes = Self::apply_actions(&mut record, schema, actions)?;
        if !outcomes
            .iter()
            .any(|o| matches!(o, ActionOutcome::Applied { .. }))
        {
            return Ok(CommitOutcome::Untouched);
        }
        let problems = RecordValidator::validate(schema, &record);
        if !problems.is_empty() {
            return Ok(CommitOutcome::Invalid(problems.join("; ")));
        }
        store.save_record(id, record).await?;
        Ok(CommitOutcome::Updated)
    }
}
