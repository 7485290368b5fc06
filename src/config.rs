//! Runtime configuration
//!
//! Tuning knobs come from an optional JSON file with serde defaults; the
//! API credentials come from the environment (`.env` is honored by the CLI).

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const DEFAULT_CHAT_MODEL: &str = "gpt-4";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
const DEFAULT_BATCH_SIZE: usize = 10;

/// Credentials for the external capability endpoint.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "OPENAI_API_KEY environment variable not set".to_string())?;

        let base_url = env::var("OPENAI_BASE_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self { api_key, base_url })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub record_deadline_secs: u64,
    pub batch_size: usize,
    pub item_delay_ms: u64,
    pub batch_delay_ms: u64,
    pub search_threshold: f32,
    pub search_top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            temperature: 0.3,
            max_tokens: 1000,
            request_timeout_secs: 60,
            record_deadline_secs: 120,
            batch_size: DEFAULT_BATCH_SIZE,
            item_delay_ms: 500,
            batch_delay_ms: 2000,
            search_threshold: 0.3,
            search_top_k: 20,
        }
    }
}

impl AppConfig {
    /// Loads the config file when one is given, otherwise the defaults.
    /// A missing or unparseable explicit file is an error, not a silent
    /// fallback.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("read {} failed: {e}", path.display()))
                })?;
                serde_json::from_str(&raw).map_err(|e| {
                    AppError::Config(format!("parse {} failed: {e}", path.display()))
                })?
            }
            None => Self::default(),
        };

        config.apply_defaults();
        Ok(config)
    }

    fn apply_defaults(&mut self) {
        if self.batch_size == 0 {
            self.batch_size = DEFAULT_BATCH_SIZE;
        }
        if self.embedding_dimension == 0 {
            self.embedding_dimension = DEFAULT_EMBEDDING_DIMENSION;
        }
        if self.chat_model.trim().is_empty() {
            self.chat_model = DEFAULT_CHAT_MODEL.to_string();
        }
        if self.embedding_model.trim().is_empty() {
            self.embedding_model = DEFAULT_EMBEDDING_MODEL.to_string();
        }
    }
}
