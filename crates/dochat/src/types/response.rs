//! Response types for upload and chat endpoints

use serde::{Deserialize, Serialize};

/// A successfully ingested file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// File record id
    pub id: i64,
    /// Stored filename (may carry a `_N` dedup suffix)
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    /// Number of chunks created
    pub chunks: usize,
}

/// A file that failed validation or processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadError {
    /// Filename as submitted
    pub filename: String,
    /// Why it failed
    pub error: String,
}

/// Partition of an upload batch into successes and failures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Files ingested end to end
    pub uploaded: Vec<UploadedFile>,
    /// Files rejected or rolled back
    pub errors: Vec<UploadError>,
}

impl UploadOutcome {
    /// A non-empty batch where every file failed is an overall failure
    pub fn all_failed(&self) -> bool {
        self.uploaded.is_empty() && !self.errors.is_empty()
    }
}

/// Response from the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply (or the user-safe fallback on upstream failure)
    pub message: String,
    /// Number of chunks assembled into the prompt context
    pub chunks_used: usize,
}
