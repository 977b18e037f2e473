//! File listing and upload endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{Error, Result};
use crate::ingestion::IncomingFile;
use crate::server::state::AppState;
use crate::types::StoredFile;

/// GET /api/discussions/:id/files - List all files of a discussion
pub async fn list_files(
    State(state): State<AppState>,
    Path(discussion_id): Path<i64>,
) -> Result<Json<Vec<StoredFile>>> {
    if state.db().get_discussion(discussion_id)?.is_none() {
        return Err(Error::NotFound(format!(
            "Discussion {} not found",
            discussion_id
        )));
    }

    let files = state.db().files_for_discussion(discussion_id)?;
    Ok(Json(files))
}

/// POST /api/discussions/:id/files - Upload files into a discussion
///
/// Accepts a multipart body with one part per file. Each file is validated
/// and processed independently; the response partitions the batch into
/// successes and failures. A non-empty batch where every file failed maps
/// to an overall error.
pub async fn upload_files(
    State(state): State<AppState>,
    Path(discussion_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("Failed to read file data: {}", e)))?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());

        files.push(IncomingFile {
            filename,
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(Error::InvalidInput("No files provided".to_string()));
    }

    let pipeline = state.ingest_pipeline()?;
    let outcome = pipeline.ingest(discussion_id, files)?;

    // A non-empty batch where every file failed is an overall failure; the
    // per-file error list still goes back to the client either way.
    let status = if outcome.all_failed() {
        tracing::warn!(
            "All {} files failed to upload for discussion {}",
            outcome.errors.len(),
            discussion_id
        );
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(outcome)).into_response())
}
