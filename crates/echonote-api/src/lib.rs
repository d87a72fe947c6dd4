//! echonote-api - HTTP API server for echonote.
//!
//! Library surface so integration tests can build the router in-process
//! against mock collaborators.

pub mod handlers;
pub mod session;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use echonote_core::{GenerationBackend, MediaStore, NoteRepository};

pub use session::{Session, SessionStore};

/// Shared application state.
///
/// Collaborators are trait objects so tests can substitute mocks; everything
/// here is internally synchronized, there is no other cross-request state.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteRepository>,
    pub media: Arc<dyn MediaStore>,
    pub generation: Arc<dyn GenerationBackend>,
    pub sessions: SessionStore,
}

/// Build the application router. Middleware layers are applied by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/notes",
            get(handlers::notes::list_notes)
                .post(handlers::notes::create_note)
                .patch(handlers::notes::update_note),
        )
        .route("/notes/:id", delete(handlers::notes::delete_note))
        .route(
            "/notes/:id/images",
            post(handlers::notes::attach_image).delete(handlers::notes::detach_image),
        )
        .route("/transform-note", post(handlers::transform::transform_note))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// Request-boundary error: every handler failure becomes one of these and is
/// rendered as a JSON body with the implied status code. Nothing is retried.
#[derive(Debug)]
pub enum ApiError {
    Internal(echonote_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
}

impl From<echonote_core::Error> for ApiError {
    fn from(err: echonote_core::Error) -> Self {
        use echonote_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(id) => ApiError::NotFound(format!("Note {} not found", id)),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(_) => ApiError::Unauthorized("Unauthorized".to_string()),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
