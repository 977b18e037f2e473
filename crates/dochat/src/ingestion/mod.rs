//! Document ingestion pipeline: extraction, chunking, persistence

mod chunker;
mod extractor;
mod pipeline;

pub use chunker::TextChunker;
pub use extractor::{DocumentExtractor, DocumentFormat, TextExtractor};
pub use pipeline::{IncomingFile, IngestPipeline};
