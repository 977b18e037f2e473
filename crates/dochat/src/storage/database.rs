//! SQLite storage for discussions, files, and chunks
//!
//! Three tables with cascading foreign keys: deleting a discussion removes
//! its files and their chunks in one statement.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Chunk, Discussion, StoredFile};

/// SQLite-backed store behind a connection mutex
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::storage(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run schema migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        "#,
        )
        .map_err(|e| Error::storage(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS discussions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                discussion_id INTEGER NOT NULL,
                filename TEXT NOT NULL,
                storage_path TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                uploaded_at TEXT NOT NULL,
                FOREIGN KEY (discussion_id) REFERENCES discussions(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS chunks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_id INTEGER NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (file_id) REFERENCES files(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_files_discussion_id ON files(discussion_id);
            CREATE INDEX IF NOT EXISTS idx_chunks_file_id ON chunks(file_id);
        "#,
        )
        .map_err(|e| Error::storage(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    // ==================== Discussion Operations ====================

    /// Create a new discussion and return the full record
    pub fn create_discussion(&self, name: &str, description: Option<&str>) -> Result<Discussion> {
        let conn = self.conn.lock();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO discussions (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, description, now.to_rfc3339(), now.to_rfc3339()],
        )
        .map_err(|e| Error::storage(format!("Failed to create discussion: {}", e)))?;

        let id = conn.last_insert_rowid();
        tracing::info!("Discussion created with id {}", id);

        Ok(Discussion {
            id,
            name: name.to_string(),
            description: description.map(|d| d.to_string()),
            created_at: now,
            updated_at: now,
        })
    }

    /// List all discussions, most recently updated first
    pub fn list_discussions(&self) -> Result<Vec<Discussion>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at, updated_at
             FROM discussions ORDER BY updated_at DESC",
        )?;

        let discussions = stmt
            .query_map([], row_to_discussion)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage(format!("Failed to list discussions: {}", e)))?;

        Ok(discussions)
    }

    /// Get a discussion by id
    pub fn get_discussion(&self, id: i64) -> Result<Option<Discussion>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at, updated_at
             FROM discussions WHERE id = ?1",
        )?;

        let discussion = stmt
            .query_row(params![id], row_to_discussion)
            .optional()
            .map_err(|e| Error::storage(format!("Failed to get discussion: {}", e)))?;

        Ok(discussion)
    }

    /// Update a discussion's name and/or description, bumping updated_at.
    /// Fields passed as None keep their current value.
    pub fn update_discussion(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool> {
        let conn = self.conn.lock();

        let updated = conn
            .execute(
                "UPDATE discussions SET
                    name = COALESCE(?2, name),
                    description = COALESCE(?3, description),
                    updated_at = ?4
                 WHERE id = ?1",
                params![id, name, description, Utc::now().to_rfc3339()],
            )
            .map_err(|e| Error::storage(format!("Failed to update discussion: {}", e)))?;

        Ok(updated > 0)
    }

    /// Delete a discussion; cascades to its files and chunks
    pub fn delete_discussion(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();

        let deleted = conn
            .execute("DELETE FROM discussions WHERE id = ?1", params![id])
            .map_err(|e| Error::storage(format!("Failed to delete discussion: {}", e)))?;

        if deleted > 0 {
            tracing::info!("Discussion {} deleted", id);
        }
        Ok(deleted > 0)
    }

    // ==================== File Operations ====================

    /// Insert a file record and return it
    pub fn insert_file(
        &self,
        discussion_id: i64,
        filename: &str,
        storage_path: &str,
        file_size: u64,
    ) -> Result<StoredFile> {
        let conn = self.conn.lock();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO files (discussion_id, filename, storage_path, file_size, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                discussion_id,
                filename,
                storage_path,
                file_size as i64,
                now.to_rfc3339()
            ],
        )
        .map_err(|e| Error::storage(format!("Failed to create file record: {}", e)))?;

        let id = conn.last_insert_rowid();
        tracing::info!("File record created with id {}", id);

        Ok(StoredFile {
            id,
            discussion_id,
            filename: filename.to_string(),
            storage_path: storage_path.to_string(),
            file_size,
            uploaded_at: now,
        })
    }

    /// List files for a discussion, newest first
    pub fn files_for_discussion(&self, discussion_id: i64) -> Result<Vec<StoredFile>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, discussion_id, filename, storage_path, file_size, uploaded_at
             FROM files WHERE discussion_id = ?1 ORDER BY uploaded_at DESC",
        )?;

        let files = stmt
            .query_map(params![discussion_id], row_to_file)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage(format!("Failed to list files: {}", e)))?;

        Ok(files)
    }

    /// Count files in a discussion
    pub fn count_files(&self, discussion_id: i64) -> Result<usize> {
        let conn = self.conn.lock();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM files WHERE discussion_id = ?1",
                params![discussion_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::storage(format!("Failed to count files: {}", e)))?;

        Ok(count as usize)
    }

    /// Delete a file record; cascades to its chunks
    pub fn delete_file(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();

        let deleted = conn
            .execute("DELETE FROM files WHERE id = ?1", params![id])
            .map_err(|e| Error::storage(format!("Failed to delete file: {}", e)))?;

        Ok(deleted > 0)
    }

    // ==================== Chunk Operations ====================

    /// Insert all chunks for a file in one transaction, in index order
    pub fn insert_chunks(&self, file_id: i64, contents: &[String]) -> Result<usize> {
        if contents.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock();

        let tx = conn
            .transaction()
            .map_err(|e| Error::storage(format!("Failed to begin transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (file_id, chunk_index, content, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(|e| Error::storage(format!("Failed to prepare statement: {}", e)))?;

            let now = Utc::now().to_rfc3339();
            for (index, content) in contents.iter().enumerate() {
                stmt.execute(params![file_id, index as i64, content, &now])
                    .map_err(|e| Error::storage(format!("Failed to insert chunk: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| Error::storage(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!("Created {} chunks for file {}", contents.len(), file_id);
        Ok(contents.len())
    }

    /// Load every chunk for a discussion, ordered by file creation order
    /// then chunk index. This is the retrieval used for context assembly.
    pub fn chunks_for_discussion(&self, discussion_id: i64) -> Result<Vec<Chunk>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT c.id, c.file_id, c.chunk_index, c.content, c.created_at
             FROM chunks c
             JOIN files f ON c.file_id = f.id
             WHERE f.discussion_id = ?1
             ORDER BY f.id ASC, c.chunk_index ASC",
        )?;

        let chunks = stmt
            .query_map(params![discussion_id], row_to_chunk)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage(format!("Failed to load chunks: {}", e)))?;

        Ok(chunks)
    }

    /// Load chunks for a single file in index order
    pub fn chunks_for_file(&self, file_id: i64) -> Result<Vec<Chunk>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT id, file_id, chunk_index, content, created_at
             FROM chunks WHERE file_id = ?1 ORDER BY chunk_index ASC",
        )?;

        let chunks = stmt
            .query_map(params![file_id], row_to_chunk)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage(format!("Failed to load chunks: {}", e)))?;

        Ok(chunks)
    }

    /// Total chunk count for a discussion
    pub fn count_chunks(&self, discussion_id: i64) -> Result<usize> {
        let conn = self.conn.lock();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM chunks c
                 JOIN files f ON c.file_id = f.id
                 WHERE f.discussion_id = ?1",
                params![discussion_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::storage(format!("Failed to count chunks: {}", e)))?;

        Ok(count as usize)
    }
}

// Row mappers

fn parse_timestamp(value: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&value)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_discussion(row: &rusqlite::Row) -> rusqlite::Result<Discussion> {
    Ok(Discussion {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_timestamp(row.get(3)?),
        updated_at: parse_timestamp(row.get(4)?),
    })
}

fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<StoredFile> {
    let file_size: i64 = row.get(4)?;
    Ok(StoredFile {
        id: row.get(0)?,
        discussion_id: row.get(1)?,
        filename: row.get(2)?,
        storage_path: row.get(3)?,
        file_size: file_size as u64,
        uploaded_at: parse_timestamp(row.get(5)?),
    })
}

fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<Chunk> {
    let chunk_index: i64 = row.get(2)?;
    Ok(Chunk {
        id: row.get(0)?,
        file_id: row.get(1)?,
        chunk_index: chunk_index as u32,
        content: row.get(3)?,
        created_at: parse_timestamp(row.get(4)?),
    })
}
