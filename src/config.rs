use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LorekeeperConfig {
    pub log_level: String,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub host: String,
    /// Ranked list of model identifiers, tried in order.
    pub models: Vec<String>,
    /// Attempts per model on rate-limit responses.
    pub retry_max_attempts: u32,
    /// Fixed delay between rate-limit retries.
    pub retry_delay_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
}

impl Default for LorekeeperConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_lorekeeper_dir()
            .join("campaigns.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            host: "http://localhost:11434".into(),
            model: "nomic-embed-text".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".into(),
            models: vec!["mistral".into(), "llama3".into()],
            retry_max_attempts: 3,
            retry_delay_secs: 5,
            timeout_secs: 300,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_limit: 5 }
    }
}

/// Returns `~/.lorekeeper/`
pub fn default_lorekeeper_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".lorekeeper")
}

/// Returns the default config file path: `~/.lorekeeper/config.toml`
pub fn default_config_path() -> PathBuf {
    default_lorekeeper_dir().join("config.toml")
}

impl LorekeeperConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            LorekeeperConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (LOREKEEPER_DB, LOREKEEPER_OLLAMA_HOST, LOREKEEPER_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from a key lookup; the lookup is injected so tests
    /// need not touch process-wide environment state.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("LOREKEEPER_DB") {
            self.storage.db_path = val;
        }
        if let Some(val) = var("LOREKEEPER_OLLAMA_HOST") {
            self.embedding.host = val.clone();
            self.generation.host = val;
        }
        if let Some(val) = var("LOREKEEPER_LOG_LEVEL") {
            self.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
