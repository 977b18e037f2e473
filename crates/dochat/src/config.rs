//! Configuration for the dochat service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DochatConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage paths
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload limits
    #[serde(default)]
    pub limits: UploadLimits,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Completion service configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

impl DochatConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing sections. The LLM API key can always be overridden through
    /// the `LLM_API_KEY` environment variable.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::InvalidConfiguration(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to parse config: {}", e)))?;
        config.apply_env();
        Ok(config)
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = key;
            }
        }
    }

    /// Validate cross-field invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Storage paths for the database and uploaded file bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path
    pub database_path: PathBuf,
    /// Root folder for uploaded files (one subfolder per discussion)
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/dochat.db"),
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Per-file and per-discussion upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Maximum size of a single uploaded file in bytes
    pub max_file_size: u64,
    /// Maximum number of files per discussion
    pub max_files_per_discussion: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50MB
            max_files_per_discussion: 30,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Full URL of the generateContent endpoint
    pub endpoint: String,
    /// API key (overridden by the LLM_API_KEY environment variable)
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
                .to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}
