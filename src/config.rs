//! Configuration module for the document question-answering service.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `ELARA_` and use double underscores
//! to separate nested levels:
//! - `ELARA_RETRIEVAL__TOP_K=5` sets `retrieval.top_k`
//! - `ELARA_LLM__MODEL=openai/gpt-4o-mini` sets `llm.model`
//! - `ELARA_SERVER__BIND=0.0.0.0:8000` sets `server.bind`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::documents::ChunkingConfig;

/// Directory holding the workspace configuration.
pub const CONFIG_DIR: &str = ".elara";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "ELARA_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Embedding model settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Document chunking settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval and re-ranking settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Completion service settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Logging levels, overridable per module.
///
/// ```toml
/// [logging]
/// default = "warn"
///
/// [logging.modules]
/// rag = "debug"
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all targets
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides (target -> level)
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// fastembed model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Where downloaded model files are cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Show download progress on first use
    #[serde(default = "default_true")]
    pub show_download_progress: bool,

    /// Batch size handed to the model (None lets fastembed decide)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexConfig {
    /// Width of every stored vector
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetrievalConfig {
    /// Number of nearest neighbours fetched per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Re-ranking heuristics
    #[serde(default)]
    pub boost: BoostConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BoostConfig {
    /// Boost chunks containing a query term
    #[serde(default = "default_true")]
    pub exact_match: bool,

    #[serde(default = "default_exact_match_factor")]
    pub exact_match_factor: f32,

    /// Boost recently uploaded chunks (needs chunk metadata)
    #[serde(default = "default_true")]
    pub recency: bool,

    #[serde(default = "default_recency_factor")]
    pub recency_factor: f32,

    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// Environment variable holding the bearer key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Transport timeout for one completion call
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional system message sent before the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Allow any origin
    #[serde(default = "default_true")]
    pub cors: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_dimension() -> usize {
    384
}
fn default_top_k() -> usize {
    10
}
fn default_exact_match_factor() -> f32 {
    1.1
}
fn default_recency_factor() -> f32 {
    1.2
}
fn default_recency_window_days() -> i64 {
    7
}
fn default_llm_api_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
fn default_llm_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}
fn default_llm_model() -> String {
    "openai/gpt-5-chat".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    512
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            logging: LoggingConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            cache_dir: None,
            show_download_progress: true,
            batch_size: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            boost: BoostConfig::default(),
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            exact_match: true,
            exact_match_factor: default_exact_match_factor(),
            recency: true,
            recency_factor: default_recency_factor(),
            recency_window_days: default_recency_window_days(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key_env: default_llm_api_key_env(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            system_prompt: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            cors: true,
        }
    }
}

impl EmbeddingConfig {
    /// Cache directory for model files, falling back to the user cache dir.
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("elara")
                .join("models")
        })
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(&config_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nesting levels, single underscore stays in field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find `.elara/settings.toml` from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join("settings.toml"))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.index.dimension, 384);
        assert_eq!(settings.retrieval.top_k, 10);
        assert_eq!(settings.chunking.chunk_size, 2000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert!(settings.retrieval.boost.exact_match);
        assert!(settings.retrieval.boost.recency);
        assert_eq!(settings.llm.max_tokens, 512);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[retrieval]
top_k = 4

[retrieval.boost]
recency = false

[llm]
model = "mistralai/mistral-small"
max_tokens = 256

[logging.modules]
rag = "debug"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.retrieval.top_k, 4);
        assert!(!settings.retrieval.boost.recency);
        // Untouched nested values keep their defaults
        assert!(settings.retrieval.boost.exact_match);
        assert_eq!(settings.llm.model, "mistralai/mistral-small");
        assert_eq!(settings.llm.max_tokens, 256);
        assert_eq!(settings.logging.modules["rag"], "debug");
        assert_eq!(settings.server.bind, "127.0.0.1:8000");
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.chunking.chunk_size = 800;
        settings.server.bind = "0.0.0.0:9000".to_string();

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.chunking.chunk_size, 800);
        assert_eq!(loaded.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.embedding.model, "AllMiniLML6V2");
        assert_eq!(settings.llm.api_key_env, "OPENROUTER_API_KEY");
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[llm]\ntimeout_secs = 10\n").unwrap();

        unsafe {
            std::env::set_var("ELARA_LLM__TIMEOUT_SECS", "42");
        }
        let settings = Settings::load_from(&config_path).unwrap();
        unsafe {
            std::env::remove_var("ELARA_LLM__TIMEOUT_SECS");
        }

        assert_eq!(settings.llm.timeout_secs, 42);
    }
}
