//! dochat: discussion-based document Q&A
//!
//! Users create discussions, upload reference documents (PDF/DOCX) into them,
//! and chat with an assistant whose answers are grounded in the extracted text
//! of the uploaded files. Documents are split into overlapping chunks at
//! ingestion time; every chunk of a discussion is assembled into the prompt
//! context for each chat completion call.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod server;
pub mod storage;
pub mod types;

pub use config::DochatConfig;
pub use error::{Error, Result};
pub use types::{
    chat::{ChatRequest, ChatTurn, Role},
    discussion::Discussion,
    file::StoredFile,
    response::{ChatResponse, UploadError, UploadOutcome, UploadedFile},
};
