//! Domain types shared across the service

pub mod chat;
pub mod discussion;
pub mod file;
pub mod response;

pub use chat::{ChatRequest, ChatTurn, Role};
pub use discussion::Discussion;
pub use file::{Chunk, StoredFile};
pub use response::{ChatResponse, UploadError, UploadOutcome, UploadedFile};
