//! Chat orchestration
//!
//! Combines the discussion's document context, the prior conversation, and
//! the new user message into one completion request, and normalizes the
//! response. A failing completion service yields a user-safe fallback
//! message; the underlying cause is logged, never surfaced.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::storage::Database;
use crate::types::chat::{ChatTurn, Role};
use crate::types::response::ChatResponse;

use super::gemini::CompletionService;
use super::prompt::PromptBuilder;

/// Message returned when the completion service fails
const FALLBACK_MESSAGE: &str = "[AI Error]: Unable to generate response. Please try again.";

/// Orchestrates one chat request against a discussion
pub struct ChatService {
    db: Database,
    completion: Arc<dyn CompletionService>,
}

impl ChatService {
    /// Create a chat service
    pub fn new(db: Database, completion: Arc<dyn CompletionService>) -> Self {
        Self { db, completion }
    }

    /// Answer a user message grounded in the discussion's documents.
    ///
    /// Rejects empty messages and discussions without any chunks before the
    /// completion service is involved at all.
    pub async fn answer(
        &self,
        discussion_id: i64,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<ChatResponse> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::InvalidInput("Message cannot be empty".to_string()));
        }

        if self.db.get_discussion(discussion_id)?.is_none() {
            return Err(Error::NotFound(format!(
                "Discussion {} not found",
                discussion_id
            )));
        }

        let chunks = self.db.chunks_for_discussion(discussion_id)?;
        if chunks.is_empty() {
            return Err(Error::NoContext(
                "No files uploaded yet. Please upload documents before chatting.".to_string(),
            ));
        }

        let system_instruction = PromptBuilder::build_system_instruction(&chunks);

        let mut turns: Vec<ChatTurn> = history.to_vec();
        turns.push(ChatTurn {
            role: Role::User,
            text: message.to_string(),
        });

        tracing::info!(
            "Sending completion request for discussion {} ({} chunks, {} turns)",
            discussion_id,
            chunks.len(),
            turns.len()
        );

        let reply = match self.completion.complete(&system_instruction, &turns).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Completion service failure: {}", e);
                FALLBACK_MESSAGE.to_string()
            }
        };

        Ok(ChatResponse {
            message: reply,
            chunks_used: chunks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completion stub that counts calls and returns a canned result
    struct StubCompletion {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubCompletion {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionService for StubCompletion {
        async fn complete(&self, _system: &str, _turns: &[ChatTurn]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Upstream("connection refused".to_string()))
            } else {
                Ok("The document says hello.".to_string())
            }
        }
    }

    fn seeded_db() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let d = db.create_discussion("Chat", None).unwrap();
        let f = db.insert_file(d.id, "doc.pdf", "p", 1).unwrap();
        db.insert_chunks(f.id, &["The document says hello.".into()]).unwrap();
        (db, d.id)
    }

    #[tokio::test]
    async fn empty_message_is_rejected_before_any_call() {
        let (db, id) = seeded_db();
        let stub = StubCompletion::new(false);
        let service = ChatService::new(db, stub.clone());

        let result = service.answer(id, "   ", &[]).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn missing_discussion_is_not_found() {
        let db = Database::in_memory().unwrap();
        let stub = StubCompletion::new(false);
        let service = ChatService::new(db, stub.clone());

        let result = service.answer(99, "hello", &[]).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn discussion_without_chunks_is_no_context_and_skips_the_service() {
        let db = Database::in_memory().unwrap();
        let d = db.create_discussion("Empty", None).unwrap();
        let stub = StubCompletion::new(false);
        let service = ChatService::new(db, stub.clone());

        let result = service.answer(d.id, "anything in here?", &[]).await;
        assert!(matches!(result, Err(Error::NoContext(_))));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn successful_completion_reports_chunks_used() {
        let (db, id) = seeded_db();
        let stub = StubCompletion::new(false);
        let service = ChatService::new(db, stub.clone());

        let history = vec![ChatTurn {
            role: Role::User,
            text: "earlier question".to_string(),
        }];
        let response = service.answer(id, "What does it say?", &history).await.unwrap();

        assert_eq!(response.message, "The document says hello.");
        assert_eq!(response.chunks_used, 1);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_yields_fallback_not_an_error() {
        let (db, id) = seeded_db();
        let stub = StubCompletion::new(true);
        let service = ChatService::new(db, stub.clone());

        let response = service.answer(id, "What does it say?", &[]).await.unwrap();

        assert_eq!(response.message, FALLBACK_MESSAGE);
        assert_eq!(stub.calls(), 1);
    }
}
