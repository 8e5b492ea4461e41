use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `SALON_SUITE__` and TOML config files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub promotions: PromotionsConfig,
}

/// Tunables for the promotion engine.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionsConfig {
    /// Days since last visit after which a customer counts as inactive
    /// for `inactive_customers`-segmented promotions.
    #[serde(default = "default_inactivity_days")]
    pub inactivity_days: u32,
    /// Bound on optimistic-concurrency retries per counter write during
    /// usage commit.
    #[serde(default = "default_commit_max_attempts")]
    pub commit_max_attempts: u32,
}

// Default functions
fn default_node_id() -> String {
    "salon-01".to_string()
}
fn default_inactivity_days() -> u32 {
    90
}
fn default_commit_max_attempts() -> u32 {
    3
}

impl Default for PromotionsConfig {
    fn default() -> Self {
        Self {
            inactivity_days: default_inactivity_days(),
            commit_max_attempts: default_commit_max_attempts(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            promotions: PromotionsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("SALON_SUITE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
