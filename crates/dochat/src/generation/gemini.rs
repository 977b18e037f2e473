//! Gemini-style completion service client
//!
//! The completion service is an opaque, possibly slow, possibly failing
//! remote dependency. A single call per chat request, no retries; response
//! parsing defaults to empty values at every level so an unexpected shape
//! never panics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::types::chat::ChatTurn;

/// Boundary to the remote text-completion service
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send a system instruction plus ordered conversation turns and return
    /// the first candidate's text
    async fn complete(&self, system_instruction: &str, turns: &[ChatTurn]) -> Result<String>;
}

/// HTTP client for a `generateContent`-style endpoint
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client from the LLM configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateResponse {
    /// First candidate's text; empty when the shape is not what we expect
    fn candidate_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, system_instruction: &str, turns: &[ChatTurn]) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role.as_str().to_string(),
                    parts: vec![Part {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Completion service returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse completion response: {}", e)))?;

        Ok(parsed.candidate_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_response_yields_first_candidate_text() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"hello"},{"text":"ignored"}]}},
                {"content":{"parts":[{"text":"second candidate"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.candidate_text(), "hello");
    }

    #[test]
    fn missing_fields_default_to_empty_text() {
        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.candidate_text(), "");

        let no_parts: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{}}]}"#).unwrap();
        assert_eq!(no_parts.candidate_text(), "");

        let no_content: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert_eq!(no_content.candidate_text(), "");

        let no_text: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#).unwrap();
        assert_eq!(no_text.candidate_text(), "");
    }
}
