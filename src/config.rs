use crate::error::{Result, SubflowError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service endpoints and workflow tunables, loaded from the config file and
/// overridden by `SUBFLOW_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub transcription_url: Option<String>,
    pub translation_url: Option<String>,
    pub metadata_url: Option<String>,
    /// Public URL prefix recorded in metadata for persisted artifacts.
    pub asset_base_url: Option<String>,
    /// Root directory of the local object store.
    pub store_root: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    pub translate_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcription_url: None,
            translation_url: None,
            metadata_url: None,
            asset_base_url: None,
            store_root: None,
            poll_interval_secs: 30,
            max_poll_attempts: 20,
            translate_concurrency: 4,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(url) = std::env::var("SUBFLOW_TRANSCRIPTION_URL") {
            config.transcription_url = Some(url);
        }
        if let Ok(url) = std::env::var("SUBFLOW_TRANSLATION_URL") {
            config.translation_url = Some(url);
        }
        if let Ok(url) = std::env::var("SUBFLOW_METADATA_URL") {
            config.metadata_url = Some(url);
        }
        if let Ok(url) = std::env::var("SUBFLOW_ASSET_BASE_URL") {
            config.asset_base_url = Some(url);
        }
        if let Ok(root) = std::env::var("SUBFLOW_STORE_ROOT") {
            config.store_root = Some(PathBuf::from(root));
        }
        if let Ok(interval) = std::env::var("SUBFLOW_POLL_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse() {
                config.poll_interval_secs = secs;
            }
        }
        if let Ok(attempts) = std::env::var("SUBFLOW_MAX_POLL_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                config.max_poll_attempts = n;
            }
        }
        if let Ok(concurrency) = std::env::var("SUBFLOW_TRANSLATE_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                config.translate_concurrency = c;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.transcription_url.is_none() {
            return Err(SubflowError::Config(
                "Transcription service URL not set. Export SUBFLOW_TRANSCRIPTION_URL.".to_string(),
            ));
        }
        if self.translation_url.is_none() {
            return Err(SubflowError::Config(
                "Translation service URL not set. Export SUBFLOW_TRANSLATION_URL.".to_string(),
            ));
        }
        if self.metadata_url.is_none() {
            return Err(SubflowError::Config(
                "Metadata service URL not set. Export SUBFLOW_METADATA_URL.".to_string(),
            ));
        }
        if self.asset_base_url.is_none() {
            return Err(SubflowError::Config(
                "Asset base URL not set. Export SUBFLOW_ASSET_BASE_URL.".to_string(),
            ));
        }
        if self.store_root.is_none() {
            return Err(SubflowError::Config(
                "Object store root not set. Export SUBFLOW_STORE_ROOT.".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(SubflowError::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }
        if self.max_poll_attempts == 0 {
            return Err(SubflowError::Config(
                "Max poll attempts must be greater than 0".to_string(),
            ));
        }
        if self.translate_concurrency == 0 {
            return Err(SubflowError::Config(
                "Translate concurrency must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("subflow").join("config.toml"))
    }
}
