//! Discussion management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::Discussion;

/// Body for creating a discussion
#[derive(Debug, Deserialize)]
pub struct CreateDiscussionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for updating a discussion; omitted fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateDiscussionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /api/discussions - List all discussions
pub async fn list_discussions(State(state): State<AppState>) -> Result<Json<Vec<Discussion>>> {
    let discussions = state.db().list_discussions()?;
    Ok(Json(discussions))
}

/// POST /api/discussions - Create a discussion
pub async fn create_discussion(
    State(state): State<AppState>,
    Json(request): Json<CreateDiscussionRequest>,
) -> Result<Json<Discussion>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput(
            "Discussion name cannot be empty".to_string(),
        ));
    }

    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let discussion = state.db().create_discussion(name, description)?;
    Ok(Json(discussion))
}

/// GET /api/discussions/:id - Fetch one discussion
pub async fn get_discussion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Discussion>> {
    let discussion = state
        .db()
        .get_discussion(id)?
        .ok_or_else(|| Error::NotFound(format!("Discussion {} not found", id)))?;
    Ok(Json(discussion))
}

/// PUT /api/discussions/:id - Update name and/or description
pub async fn update_discussion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDiscussionRequest>,
) -> Result<Json<Discussion>> {
    let name = request.name.as_deref().map(str::trim);
    if let Some(name) = name {
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Discussion name cannot be empty".to_string(),
            ));
        }
    }
    let description = request.description.as_deref().map(str::trim);

    let updated = state.db().update_discussion(id, name, description)?;
    if !updated {
        return Err(Error::NotFound(format!("Discussion {} not found", id)));
    }

    let discussion = state
        .db()
        .get_discussion(id)?
        .ok_or_else(|| Error::NotFound(format!("Discussion {} not found", id)))?;
    Ok(Json(discussion))
}

/// DELETE /api/discussions/:id - Delete a discussion, its files, and its
/// chunks; the discussion's upload folder is removed as well
pub async fn delete_discussion(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let deleted = state.db().delete_discussion(id)?;
    if !deleted {
        return Err(Error::NotFound(format!("Discussion {} not found", id)));
    }

    if let Err(e) = state.files().remove_discussion_dir(id) {
        tracing::warn!("Failed to remove upload folder for discussion {}: {}", id, e);
    }

    Ok(Json(serde_json::json!({
        "message": "Discussion deleted successfully"
    })))
}
