//! Configuration loading and management for bid-analyser.
//!
//! Loads settings from `bid-analyser.toml` with the API key taken from the
//! environment. Every field has a default, so a missing file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "bid-analyser.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid chunking settings: {0}")]
    InvalidChunking(#[from] crate::chunker::ChunkError),
}

/// LLM endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible chat-completion endpoint
    pub api_url: String,
    /// Model identifier (e.g., "llama3-8b-8192")
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts per call, including the first
    pub max_retries: u32,
    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,
    /// Loaded from `api_key_env`, never from the file
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Chunking configuration, in characters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

/// Pipeline and session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delay between consecutive chunk calls
    pub pacing_ms: u64,
    /// Number of Q&A pairs shown in the history view
    pub history_limit: usize,
    /// Directory summaries are exported to
    pub export_dir: PathBuf,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from the default location (bid-analyser.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no {} found, using defaults", CONFIG_FILE);
                let mut config = Config::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        config.apply_env();
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::chunker::ChunkSplitter::new(self.chunking.chunk_size, self.chunking.overlap)?;
        Ok(())
    }

    /// Pull the API key from the configured environment variable
    fn apply_env(&mut self) {
        self.llm.api_key = std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("bid-analyser").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PipelineConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama3-8b-8192".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            timeout_secs: 30,
            max_retries: 3,
            api_key_env: "GROQ_API_KEY".to_string(),
            api_key: None,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4000,
            overlap: 500,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 1200,
            history_limit: 10,
            export_dir: PathBuf::from("."),
        }
    }
}
