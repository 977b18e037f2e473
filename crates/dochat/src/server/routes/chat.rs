//! Chat endpoint

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::chat::ChatRequest;
use crate::types::response::ChatResponse;

/// POST /api/discussions/:id/chat - Ask a question grounded in the
/// discussion's uploaded documents
pub async fn send_message(
    State(state): State<AppState>,
    Path(discussion_id): Path<i64>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let service = state.chat_service();
    let response = service
        .answer(discussion_id, &request.message, &request.history)
        .await?;
    Ok(Json(response))
}
