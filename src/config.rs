use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Runtime settings for the search client
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Base URL of the recipe server
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Category sent when no filter is selected
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Number of ingredient tags shown on a card before "+N more"
    #[serde(default = "default_ingredient_display_cap")]
    pub ingredient_display_cap: usize,
    /// Drop cached recipes when a new search starts
    #[serde(default = "default_clear_store_on_search")]
    pub clear_store_on_search: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            default_category: default_category(),
            ingredient_display_cap: default_ingredient_display_cap(),
            clear_store_on_search: default_clear_store_on_search(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_category() -> String {
    "all".to_string()
}

fn default_ingredient_display_cap() -> usize {
    6
}

fn default_clear_store_on_search() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from `recipe_cards.toml` and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_CARDS__ prefix
    /// 2. recipe_cards.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_CARDS__BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        load_config("recipe_cards")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from the named file (extension optional) and the environment
pub fn load_config(file_name: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name(file_name).required(false))
        // Use double underscore for nested keys
        .add_source(
            Environment::with_prefix("RECIPE_CARDS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
