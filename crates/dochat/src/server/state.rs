//! Application state for the dochat server

use std::sync::Arc;

use crate::config::DochatConfig;
use crate::error::Result;
use crate::generation::{ChatService, CompletionService, GeminiClient};
use crate::ingestion::IngestPipeline;
use crate::storage::{Database, FileStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: DochatConfig,
    /// SQLite store
    db: Database,
    /// Uploaded bytes store
    files: FileStore,
    /// Completion service client
    completion: Arc<dyn CompletionService>,
}

impl AppState {
    /// Create new application state, validating configuration up front
    pub fn new(config: DochatConfig) -> Result<Self> {
        config.validate()?;

        let db = Database::new(&config.storage.database_path)?;
        tracing::info!(
            "Database initialized at {}",
            config.storage.database_path.display()
        );

        let files = FileStore::new(config.storage.upload_dir.clone());
        tracing::info!("Upload folder: {}", config.storage.upload_dir.display());

        let completion: Arc<dyn CompletionService> = Arc::new(GeminiClient::new(&config.llm)?);
        tracing::info!("Completion client initialized");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                files,
                completion,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &DochatConfig {
        &self.inner.config
    }

    /// Get the database
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get the file-byte store
    pub fn files(&self) -> &FileStore {
        &self.inner.files
    }

    /// Build an ingestion pipeline from this state
    pub fn ingest_pipeline(&self) -> Result<IngestPipeline> {
        IngestPipeline::new(
            self.inner.db.clone(),
            self.inner.files.clone(),
            self.inner.config.limits.clone(),
            &self.inner.config.chunking,
        )
    }

    /// Build a chat service from this state
    pub fn chat_service(&self) -> ChatService {
        ChatService::new(self.inner.db.clone(), Arc::clone(&self.inner.completion))
    }
}
