use chrono::{Duration, Utc};
use multiedit_rust::config::EditorConfig;
use multiedit_rust::logic::BatchEditor;
use multiedit_rust::model::{RecordRef, SearchSnapshot, UserAction};
use multiedit_rust::seed;
use multiedit_rust::store::{MemoryStore, RecordStore};
use multiedit_rust::EditorError;
use serde_json::json;

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    seed::load_seed_data(&store).unwrap();
    store
}

fn date_addition() -> Vec<UserAction> {
    serde_json::from_value(json!([
        {
            "action_type": "addition",
            "keypath": ["preprint_date"],
            "value": "2016-06",
            "conditions": [
                {"keypath": ["preprint_date"], "match_type": "missing", "value": ""}
            ]
        }
    ]))
    .unwrap()
}

#[tokio::test]
async fn preview_mutates_snapshots_without_persisting() {
    let store = seeded_store();
    let preview = BatchEditor::preview_page(&store, "", 10, 1, "literature", &date_addition())
        .await
        .unwrap();

    assert_eq!(preview.original_records.len(), 3);
    for (original, mutated) in preview
        .original_records
        .iter()
        .zip(&preview.mutated_records)
    {
        assert!(original.get("preprint_date").is_none());
        assert_eq!(mutated["preprint_date"], json!("2016-06"));
    }
    assert!(preview.errors.is_empty());

    // Nothing was saved.
    let stored = store.get_record(&"1001".to_string()).await.unwrap().unwrap();
    assert!(stored.get("preprint_date").is_none());
}

#[tokio::test]
async fn commit_persists_every_selected_record() {
    let store = seeded_store();
    let config = EditorConfig::default();
    let snapshot = BatchEditor::snapshot_search(&store, "", "literature", &config)
        .await
        .unwrap();
    assert_eq!(snapshot.ids.len(), 3);

    let report =
        BatchEditor::commit_selection(&store, &snapshot, true, &[], &date_addition(), &config)
            .await
            .unwrap();
    assert_eq!(report.updated, 3);
    assert_eq!(report.skipped, 0);
    assert!(report.errors.is_empty());

    let stored = store.get_record(&"1002".to_string()).await.unwrap().unwrap();
    assert_eq!(stored["preprint_date"], json!("2016-06"));
}

#[tokio::test]
async fn commit_respects_the_operator_selection() {
    let store = seeded_store();
    let config = EditorConfig::default();
    let snapshot = BatchEditor::snapshot_search(&store, "", "literature", &config)
        .await
        .unwrap();

    // all_selected with one exclusion: everything but 1002.
    let report = BatchEditor::commit_selection(
        &store,
        &snapshot,
        true,
        &["1002".to_string()],
        &date_addition(),
        &config,
    )
    .await
    .unwrap();
    assert_eq!(report.updated, 2);

    let excluded = store.get_record(&"1002".to_string()).await.unwrap().unwrap();
    assert!(excluded.get("preprint_date").is_none());
}

#[tokio::test]
async fn second_commit_under_missing_guard_changes_nothing() {
    let store = seeded_store();
    let config = EditorConfig::default();
    let snapshot = BatchEditor::snapshot_search(&store, "", "literature", &config)
        .await
        .unwrap();

    let first = BatchEditor::commit_selection(&store, &snapshot, true, &[], &date_addition(), &config)
        .await
        .unwrap();
    assert_eq!(first.updated, 3);

    let second =
        BatchEditor::commit_selection(&store, &snapshot, true, &[], &date_addition(), &config)
            .await
            .unwrap();
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 3);
}

#[tokio::test]
async fn invalid_record_is_reported_and_not_saved_while_siblings_proceed() {
    let store = seeded_store();
    let config = EditorConfig::default();
    let snapshot = BatchEditor::snapshot_search(&store, "", "literature", &config)
        .await
        .unwrap();

    // "unknown" cannot be coerced to the integer kind of number_of_pages,
    // so the one record holding 184 fails validation after mutation.
    let actions: Vec<UserAction> = serde_json::from_value(json!([
        {
            "action_type": "update",
            "keypath": ["number_of_pages"],
            "match_type": "exact",
            "update_value": "184",
            "value": "unknown"
        },
        {
            "action_type": "addition",
            "keypath": ["preprint_date"],
            "value": "2016-06"
        }
    ]))
    .unwrap();

    let report = BatchEditor::commit_selection(&store, &snapshot, true, &[], &actions, &config)
        .await
        .unwrap();
    assert_eq!(report.updated, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].record, RecordRef::Id("1002".to_string()));

    // The invalid record kept its pre-mutation state.
    let invalid = store.get_record(&"1002".to_string()).await.unwrap().unwrap();
    assert_eq!(invalid["number_of_pages"], json!(184));
    assert!(invalid.get("preprint_date").is_none());

    // Its siblings were updated normally.
    let sibling = store.get_record(&"1001".to_string()).await.unwrap().unwrap();
    assert_eq!(sibling["preprint_date"], json!("2016-06"));
}

#[tokio::test]
async fn over_broad_searches_are_rejected_before_any_engine_work() {
    let store = seeded_store();
    let config = EditorConfig {
        max_records: 2,
        ..EditorConfig::default()
    };
    let err = BatchEditor::snapshot_search(&store, "", "literature", &config)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EditorError>(),
        Some(EditorError::TooManyRecords { total: 3, limit: 2 })
    ));
}

#[tokio::test]
async fn expired_snapshots_cannot_be_committed() {
    let store = seeded_store();
    let config = EditorConfig::default();
    let snapshot = SearchSnapshot {
        ids: vec!["1001".to_string()],
        index: "literature".to_string(),
        created_at: Utc::now() - Duration::minutes(120),
    };
    let err =
        BatchEditor::commit_selection(&store, &snapshot, true, &[], &date_addition(), &config)
            .await
            .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EditorError>(),
        Some(EditorError::SnapshotExpired)
    ));
}

#[tokio::test]
async fn single_record_chunks_still_cover_the_whole_batch() {
    let store = seeded_store();
    let config = EditorConfig {
        chunk_size: 1,
        ..EditorConfig::default()
    };
    let ids: Vec<String> = vec!["1001".into(), "1002".into(), "1003".into()];
    let report = BatchEditor::commit(&store, &ids, "literature", &date_addition(), &config)
        .await
        .unwrap();
    assert_eq!(report.updated, 3);
}

#[tokio::test]
async fn unknown_record_ids_become_per_record_errors() {
    let store = seeded_store();
    let config = EditorConfig::default();
    let ids: Vec<String> = vec!["1001".into(), "9999".into()];
    let report = BatchEditor::commit(&store, &ids, "literature", &date_addition(), &config)
        .await
        .unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].record, RecordRef::Id("9999".to_string()));
}
