//! RecipeBox configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::Deserialize;

/// Main RecipeBox configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the storage slots
    #[serde(rename = "store-path")]
    pub store_path: PathBuf,

    /// Slot the collection is stored under
    #[serde(rename = "storage-key")]
    pub storage_key: String,

    /// Recipes per page
    #[serde(rename = "page-size")]
    pub page_size: usize,

    /// Quiet period before typed search text is applied
    #[serde(rename = "search-debounce-ms")]
    pub search_debounce_ms: u64,

    /// Largest image file accepted for a recipe
    #[serde(rename = "max-image-bytes")]
    pub max_image_bytes: u64,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Directory for recipebox.log
    #[serde(rename = "log-dir")]
    pub log_dir: PathBuf,
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recipebox")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: data_dir(),
            storage_key: recipestore::DEFAULT_STORAGE_KEY.to_string(),
            page_size: recipestore::DEFAULT_PAGE_SIZE,
            search_debounce_ms: 300,
            max_image_bytes: 5 * 1024 * 1024,
            log_level: None,
            log_dir: data_dir().join("logs"),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .recipebox.yml
        let local_config = PathBuf::from(".recipebox.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/recipebox/recipebox.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("recipebox").join("recipebox.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the app cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(eyre::eyre!("page-size must be at least 1"));
        }
        if self.storage_key.trim().is_empty() {
            return Err(eyre::eyre!("storage-key must not be empty"));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
