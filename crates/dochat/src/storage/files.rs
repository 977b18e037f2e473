//! On-disk storage for uploaded file bytes
//!
//! One subfolder per discussion under the configured upload root.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Filesystem store for uploaded bytes
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Folder holding all files of one discussion
    pub fn discussion_dir(&self, discussion_id: i64) -> PathBuf {
        self.root.join(format!("discussion_{}", discussion_id))
    }

    /// Write bytes to a path, creating parent directories as needed
    pub fn save(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// Check whether a path already holds a stored file
    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Remove stored bytes; missing files are not an error
    pub fn remove(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Size of a stored file in bytes
    pub fn size(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    /// Remove a discussion's entire folder, if present
    pub fn remove_discussion_dir(&self, discussion_id: i64) -> Result<()> {
        let dir = self.discussion_dir(discussion_id);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}
