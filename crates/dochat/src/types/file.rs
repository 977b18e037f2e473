//! File and chunk records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded file owned by a discussion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    /// Row id
    pub id: i64,
    /// Owning discussion
    pub discussion_id: i64,
    /// Display filename, deduplicated within the discussion folder
    pub filename: String,
    /// Location of the stored bytes
    pub storage_path: String,
    /// Size in bytes as measured on disk
    pub file_size: u64,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

/// A chunk of extracted text belonging to a file
///
/// Chunk indices are contiguous from 0 per file and reflect document order.
/// Chunks are immutable once created; the only mutation path is bulk delete
/// through the owning file or discussion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Row id
    pub id: i64,
    /// Owning file
    pub file_id: i64,
    /// Zero-based position within the file
    pub chunk_index: u32,
    /// Trimmed, non-empty text content
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
