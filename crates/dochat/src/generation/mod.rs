//! Chat generation: prompt assembly and completion-service access

mod chat;
mod gemini;
mod prompt;

pub use chat::ChatService;
pub use gemini::{CompletionService, GeminiClient};
pub use prompt::PromptBuilder;
