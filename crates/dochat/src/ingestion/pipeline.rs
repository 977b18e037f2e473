//! Upload ingestion pipeline
//!
//! Validates a batch of incoming files against a discussion, persists the
//! bytes, extracts and chunks the text, and stores the chunks. Each file in
//! a batch is processed independently; a failure rolls back that file's
//! record and bytes without touching its siblings.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ChunkingConfig, UploadLimits};
use crate::error::{Error, Result};
use crate::storage::{Database, FileStore};
use crate::types::response::{UploadError, UploadOutcome, UploadedFile};

use super::chunker::TextChunker;
use super::extractor::{DocumentExtractor, DocumentFormat, TextExtractor};

/// One file of an upload request
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename as submitted by the client
    pub filename: String,
    /// Raw file bytes
    pub data: Vec<u8>,
}

/// Ingestion pipeline for one discussion's uploads
pub struct IngestPipeline {
    db: Database,
    store: FileStore,
    extractor: Arc<dyn TextExtractor>,
    chunker: TextChunker,
    limits: UploadLimits,
}

impl IngestPipeline {
    /// Create a pipeline with the real document extractor
    pub fn new(
        db: Database,
        store: FileStore,
        limits: UploadLimits,
        chunking: &ChunkingConfig,
    ) -> Result<Self> {
        Self::with_extractor(db, store, limits, chunking, Arc::new(DocumentExtractor))
    }

    /// Create a pipeline with a custom extractor
    pub fn with_extractor(
        db: Database,
        store: FileStore,
        limits: UploadLimits,
        chunking: &ChunkingConfig,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self> {
        let chunker = TextChunker::new(chunking.chunk_size, chunking.chunk_overlap)?;
        Ok(Self {
            db,
            store,
            extractor,
            chunker,
            limits,
        })
    }

    /// Ingest a batch of files into a discussion.
    ///
    /// The discussion must exist and the batch must fit within the
    /// per-discussion file-count limit; those checks reject the whole
    /// request. Everything after that is per-file: validation and
    /// processing failures are collected and reported next to the
    /// successes.
    pub fn ingest(&self, discussion_id: i64, files: Vec<IncomingFile>) -> Result<UploadOutcome> {
        if self.db.get_discussion(discussion_id)?.is_none() {
            return Err(Error::NotFound(format!(
                "Discussion {} not found",
                discussion_id
            )));
        }

        let current_count = self.db.count_files(discussion_id)?;
        if current_count + files.len() > self.limits.max_files_per_discussion {
            return Err(Error::LimitExceeded(format!(
                "Maximum {} files per discussion. Currently {} files uploaded.",
                self.limits.max_files_per_discussion, current_count
            )));
        }

        let mut outcome = UploadOutcome::default();

        for file in files {
            match self.ingest_one(discussion_id, &file) {
                Ok(uploaded) => {
                    tracing::info!(
                        "Ingested '{}' ({} bytes, {} chunks)",
                        uploaded.filename,
                        uploaded.size,
                        uploaded.chunks
                    );
                    outcome.uploaded.push(uploaded);
                }
                Err(e) => {
                    tracing::warn!("Upload of '{}' failed: {}", file.filename, e);
                    outcome.errors.push(UploadError {
                        filename: file.filename.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Process a single file end to end
    fn ingest_one(&self, discussion_id: i64, file: &IncomingFile) -> Result<UploadedFile> {
        if file.filename.trim().is_empty() {
            return Err(Error::InvalidInput("No filename provided".to_string()));
        }

        let format = DocumentFormat::from_filename(&file.filename)?;

        if file.data.len() as u64 > self.limits.max_file_size {
            return Err(Error::TooLarge(format!(
                "File size exceeds maximum allowed size of {}MB",
                self.limits.max_file_size / (1024 * 1024)
            )));
        }

        let sanitized = sanitize_filename(&file.filename);
        let dir = self.store.discussion_dir(discussion_id);
        let (stored_name, path) = self.resolve_collision(&dir, &sanitized);

        self.store.save(&path, &file.data)?;
        let file_size = self.store.size(&path)?;

        let record = match self.db.insert_file(
            discussion_id,
            &stored_name,
            &path.to_string_lossy(),
            file_size,
        ) {
            Ok(record) => record,
            Err(e) => {
                // No record to roll back yet, just the bytes
                if let Err(cleanup) = self.store.remove(&path) {
                    tracing::error!("Failed to remove bytes after insert failure: {}", cleanup);
                }
                return Err(e);
            }
        };

        match self.extract_and_chunk(&path, format, &stored_name) {
            Ok(chunks) => {
                if let Err(e) = self.db.insert_chunks(record.id, &chunks) {
                    self.rollback(record.id, &path);
                    return Err(e);
                }
                Ok(UploadedFile {
                    id: record.id,
                    filename: stored_name,
                    size: file_size,
                    chunks: chunks.len(),
                })
            }
            Err(e) => {
                self.rollback(record.id, &path);
                Err(e)
            }
        }
    }

    /// Extract text and chunk it; an unreadable or empty document is a
    /// processing failure, never a silent success
    fn extract_and_chunk(
        &self,
        path: &Path,
        format: DocumentFormat,
        filename: &str,
    ) -> Result<Vec<String>> {
        let text = self.extractor.extract(path, format)?;
        let chunks = self.chunker.chunk(&text);

        if chunks.is_empty() {
            return Err(Error::processing(
                filename,
                "No text content could be extracted",
            ));
        }

        Ok(chunks)
    }

    /// Compensating rollback: delete the file record (cascading to any
    /// chunks) and remove the stored bytes
    fn rollback(&self, file_id: i64, path: &Path) {
        if let Err(e) = self.db.delete_file(file_id) {
            tracing::error!("Rollback failed to delete file record {}: {}", file_id, e);
        }
        if let Err(e) = self.store.remove(path) {
            tracing::error!("Rollback failed to remove bytes at {}: {}", path.display(), e);
        }
        tracing::info!("Rolled back file {} after processing failure", file_id);
    }

    /// Resolve a storage path, suffixing `_N` before the extension until the
    /// name is unique within the discussion folder. Existence is checked
    /// immediately before the caller writes; the store's uniqueness handling
    /// is the backstop for the residual race window.
    fn resolve_collision(&self, dir: &Path, filename: &str) -> (String, PathBuf) {
        let mut candidate = filename.to_string();
        let mut path = dir.join(&candidate);

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), format!(".{}", ext)),
            None => (filename.to_string(), String::new()),
        };

        let mut counter = 1;
        while self.store.exists(&path) {
            candidate = format!("{}_{}{}", stem, counter, ext);
            path = dir.join(&candidate);
            counter += 1;
        }

        (candidate, path)
    }
}

/// Sanitize a filename for safe storage: keep only the final path
/// component, replace whitespace with underscores, drop anything outside
/// `[A-Za-z0-9_.-]`, and strip leading dots.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let unsafe_chars = Regex::new(r"[^A-Za-z0-9_.-]").expect("valid pattern");
    let replaced = base.replace(char::is_whitespace, "_");
    let cleaned = unsafe_chars.replace_all(&replaced, "");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkingConfig, UploadLimits};

    /// Extractor stub keyed on filename: "broken" fails, "blank" yields no
    /// text, everything else extracts a fixed passage.
    struct StubExtractor;

    impl TextExtractor for StubExtractor {
        fn extract(&self, path: &Path, _format: DocumentFormat) -> Result<String> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            if name.contains("broken") {
                Err(Error::processing(name, "Failed to load PDF: simulated"))
            } else if name.contains("blank") {
                Ok(String::new())
            } else {
                Ok("First sentence of the document. Second sentence with more detail. Third sentence to close."
                    .to_string())
            }
        }
    }

    fn pipeline_with(
        tmp: &tempfile::TempDir,
        limits: UploadLimits,
    ) -> (IngestPipeline, Database, FileStore) {
        let db = Database::in_memory().unwrap();
        let store = FileStore::new(tmp.path());
        let pipeline = IngestPipeline::with_extractor(
            db.clone(),
            store.clone(),
            limits,
            &ChunkingConfig::default(),
            Arc::new(StubExtractor),
        )
        .unwrap();
        (pipeline, db, store)
    }

    fn incoming(filename: &str) -> IncomingFile {
        IncomingFile {
            filename: filename.to_string(),
            data: b"%PDF-1.4 payload".to_vec(),
        }
    }

    #[test]
    fn unknown_discussion_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, _db, _store) = pipeline_with(&tmp, UploadLimits::default());

        let result = pipeline.ingest(42, vec![incoming("a.pdf")]);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn batch_over_file_count_limit_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let limits = UploadLimits {
            max_files_per_discussion: 2,
            ..UploadLimits::default()
        };
        let (pipeline, db, _store) = pipeline_with(&tmp, limits);
        let d = db.create_discussion("Limited", None).unwrap();

        let files = vec![incoming("a.pdf"), incoming("b.pdf"), incoming("c.pdf")];
        assert!(matches!(
            pipeline.ingest(d.id, files),
            Err(Error::LimitExceeded(_))
        ));
        assert_eq!(db.count_files(d.id).unwrap(), 0);
    }

    #[test]
    fn mixed_batch_partitions_successes_and_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, db, _store) = pipeline_with(&tmp, UploadLimits::default());
        let d = db.create_discussion("Mixed", None).unwrap();

        let files = vec![
            incoming("one.pdf"),
            incoming("two.docx"),
            incoming("three.doc"),
            incoming("notes.txt"),
        ];
        let outcome = pipeline.ingest(d.id, files).unwrap();

        assert_eq!(outcome.uploaded.len(), 3);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].filename, "notes.txt");
        assert!(outcome.errors[0].error.contains("txt"));
        assert_eq!(db.count_files(d.id).unwrap(), 3);
        assert!(!outcome.all_failed());
    }

    #[test]
    fn oversized_file_fails_without_aborting_siblings() {
        let tmp = tempfile::tempdir().unwrap();
        let limits = UploadLimits {
            max_file_size: 8,
            ..UploadLimits::default()
        };
        let (pipeline, db, _store) = pipeline_with(&tmp, limits);
        let d = db.create_discussion("Sizes", None).unwrap();

        let big = IncomingFile {
            filename: "big.pdf".to_string(),
            data: vec![0u8; 64],
        };
        let small = IncomingFile {
            filename: "small.pdf".to_string(),
            data: vec![0u8; 4],
        };
        let outcome = pipeline.ingest(d.id, vec![big, small]).unwrap();

        assert_eq!(outcome.uploaded.len(), 1);
        assert_eq!(outcome.uploaded[0].filename, "small.pdf");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].filename, "big.pdf");
        assert_eq!(db.count_files(d.id).unwrap(), 1);
    }

    #[test]
    fn processing_failure_rolls_back_record_and_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, db, store) = pipeline_with(&tmp, UploadLimits::default());
        let d = db.create_discussion("Rollback", None).unwrap();

        let outcome = pipeline.ingest(d.id, vec![incoming("broken.pdf")]).unwrap();

        assert!(outcome.uploaded.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.all_failed());

        // No file record, no chunks, no bytes on disk
        assert_eq!(db.count_files(d.id).unwrap(), 0);
        assert_eq!(db.count_chunks(d.id).unwrap(), 0);
        let stored = store.discussion_dir(d.id).join("broken.pdf");
        assert!(!store.exists(&stored));
    }

    #[test]
    fn empty_extraction_is_a_failure_not_a_silent_success() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, db, _store) = pipeline_with(&tmp, UploadLimits::default());
        let d = db.create_discussion("Blank", None).unwrap();

        let outcome = pipeline.ingest(d.id, vec![incoming("blank.pdf")]).unwrap();

        assert!(outcome.uploaded.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(db.count_files(d.id).unwrap(), 0);
    }

    #[test]
    fn duplicate_filenames_get_numeric_suffixes() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, db, store) = pipeline_with(&tmp, UploadLimits::default());
        let d = db.create_discussion("Dupes", None).unwrap();

        let first = pipeline.ingest(d.id, vec![incoming("report.pdf")]).unwrap();
        let second = pipeline.ingest(d.id, vec![incoming("report.pdf")]).unwrap();

        assert_eq!(first.uploaded[0].filename, "report.pdf");
        assert_eq!(second.uploaded[0].filename, "report_1.pdf");
        assert_eq!(db.count_files(d.id).unwrap(), 2);
        assert!(store.exists(&store.discussion_dir(d.id).join("report.pdf")));
        assert!(store.exists(&store.discussion_dir(d.id).join("report_1.pdf")));
    }

    #[test]
    fn successful_upload_creates_contiguous_chunks() {
        let tmp = tempfile::tempdir().unwrap();
        let (pipeline, db, _store) = pipeline_with(&tmp, UploadLimits::default());
        let d = db.create_discussion("Chunks", None).unwrap();

        let outcome = pipeline.ingest(d.id, vec![incoming("doc.pdf")]).unwrap();
        let uploaded = &outcome.uploaded[0];

        let chunks = db.chunks_for_file(uploaded.id).unwrap();
        assert_eq!(chunks.len(), uploaded.chunks);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
            assert!(!chunk.content.trim().is_empty());
        }
    }

    #[test]
    fn filenames_are_sanitized_for_storage() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("my report.pdf"), "my_report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename("..\\evil\\run.docx"), "run.docx");
        assert_eq!(sanitize_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("r\u{00e9}sum\u{00e9}.pdf"), "rsum.pdf");
        assert_eq!(sanitize_filename("///"), "file");
    }
}
