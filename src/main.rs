use multiedit_rust::config::AppConfig;
use multiedit_rust::logic::BatchEditor;
use multiedit_rust::model::UserAction;
use multiedit_rust::seed;
use multiedit_rust::store::MemoryStore;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new().filter_level(LevelFilter::Info).init();

    println!("multiedit: bulk record editor demo");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: chunk_size={}, max_records={}",
        config.editor.chunk_size, config.editor.max_records
    );

    // Stand-in store with the literature demo data
    let store = MemoryStore::new();
    seed::load_seed_data(&store)?;

    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_default();
    let actions: Vec<UserAction> = match args.next() {
        // Actions as the editor UI would post them, from a JSON file
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => serde_json::from_value(json!([
            {
                "action_type": "addition",
                "keypath": ["preprint_date"],
                "value": "2016-06",
                "conditions": [
                    {"keypath": ["preprint_date"], "match_type": "missing", "value": ""},
                    {"keypath": ["core"], "match_type": "exact", "value": "True"}
                ]
            }
        ]))?,
    };

    println!("Searching 'literature' for '{}'...", query);
    let snapshot = BatchEditor::snapshot_search(&store, &query, "literature", &config.editor).await?;
    println!("Snapshot captured: {} matching records", snapshot.ids.len());

    let preview = BatchEditor::preview_page(
        &store,
        &query,
        config.editor.preview_page_size,
        1,
        "literature",
        &actions,
    )
    .await?;
    println!("Preview:\n{}", serde_json::to_string_pretty(&preview)?);

    let report =
        BatchEditor::commit_selection(&store, &snapshot, true, &[], &actions, &config.editor)
            .await?;
    println!(
        "Committed: {} updated, {} skipped, {} errors",
        report.updated,
        report.skipped,
        report.errors.len()
    );

    Ok(())
}
