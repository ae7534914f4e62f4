use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Records committed per dispatch chunk.
    pub chunk_size: usize,
    /// Request-level ceiling on how many records one batch may touch.
    pub max_records: usize,
    /// Documents shown per preview page.
    pub preview_page_size: usize,
    /// How long a search snapshot stays valid for commits.
    pub snapshot_ttl_minutes: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 20,
            max_records: 10_000,
            preview_page_size: 10,
            snapshot_ttl_minutes: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "MULTIEDIT_"
        config = config.add_source(
            config::Environment::with_prefix("MULTIEDIT")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }
}
