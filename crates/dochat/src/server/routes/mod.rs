//! API routes for the dochat server

pub mod chat;
pub mod discussions;
pub mod files;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Discussion management
        .route("/discussions", get(discussions::list_discussions))
        .route("/discussions", post(discussions::create_discussion))
        .route("/discussions/:id", get(discussions::get_discussion))
        .route("/discussions/:id", put(discussions::update_discussion))
        .route("/discussions/:id", delete(discussions::delete_discussion))
        // File upload - with larger body limit for multipart uploads
        .route("/discussions/:id/files", get(files::list_files))
        .route(
            "/discussions/:id/files",
            post(files::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Chat
        .route("/discussions/:id/chat", post(chat::send_message))
}
