//! Note CRUD and image sub-resource handlers.
//!
//! Every handler validates the session (explicit [`Session`] argument) and
//! ownership before touching the store. Audio and image binaries go to the
//! media collaborator first; only the returned URL is persisted.

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use echonote_core::{
    CreateAudioNoteRequest, CreateTextNoteRequest, MediaKind, UpdateNoteRequest,
};

use crate::{ApiError, AppState, Session};

/// Collected multipart fields for an audio note.
#[derive(Default)]
struct AudioNoteForm {
    title: Option<String>,
    content: Option<String>,
    transcript: Option<String>,
    duration: Option<String>,
    audio: Option<Vec<u8>>,
}

/// Create a note.
///
/// Dispatches on Content-Type: `multipart/form-data` is an audio note with a
/// binary blob; anything else is parsed as a JSON text note.
#[instrument(skip_all, fields(subsystem = "api", op = "create_note", user_id = %session.user_id()))]
pub async fn create_note(
    State(state): State<AppState>,
    session: Session,
    request: Request,
) -> Result<impl IntoResponse, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let note = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?;
        let form = read_audio_form(multipart).await?;

        let audio = form
            .audio
            .ok_or_else(|| ApiError::BadRequest("No audio file provided".to_string()))?;

        let audio_url = state.media.upload(MediaKind::Audio, &audio).await?;

        state
            .notes
            .insert_audio(
                session.user_id(),
                CreateAudioNoteRequest {
                    title: form.title,
                    description: form.content.unwrap_or_default(),
                    transcript: form.transcript.unwrap_or_default(),
                    audio_url,
                    duration: form.duration,
                },
            )
            .await?
    } else {
        let Json(req) = Json::<CreateTextNoteRequest>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

        state.notes.insert_text(session.user_id(), req).await?
    };

    info!(note_id = %note.id, note_type = note.note_type.as_str(), "Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

async fn read_audio_form(mut multipart: Multipart) -> Result<AudioNoteForm, ApiError> {
    let mut form = AudioNoteForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("audio") => {
                form.audio = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?
                        .to_vec(),
                );
            }
            Some("title") => form.title = Some(read_text(field).await?),
            Some("content") => form.content = Some(read_text(field).await?),
            Some("transcript") => form.transcript = Some(read_text(field).await?),
            Some("duration") => form.duration = Some(read_text(field).await?),
            _ => {} // ignore unknown fields
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))
}

/// List the session user's notes, newest first. Filtering is client-side.
#[instrument(skip_all, fields(subsystem = "api", op = "list_notes", user_id = %session.user_id()))]
pub async fn list_notes(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.notes.list_for_user(session.user_id()).await?;
    info!(result_count = notes.len(), "Notes listed");
    Ok(Json(notes))
}

#[derive(Deserialize)]
pub struct UpdateQuery {
    id: Option<Uuid>,
}

/// Shallow-merge update of a note, keyed by `?id=`.
#[instrument(skip_all, fields(subsystem = "api", op = "update_note", user_id = %session.user_id()))]
pub async fn update_note(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<UpdateQuery>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Note ID required".to_string()))?;

    let note = state.notes.update(id, session.user_id(), req).await?;
    info!(note_id = %note.id, "Note updated");
    Ok(Json(note))
}

/// Delete a note. Uploaded media is not cleaned up (accepted orphans).
#[instrument(skip_all, fields(subsystem = "api", op = "delete_note", user_id = %session.user_id()))]
pub async fn delete_note(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.notes.delete(id, session.user_id()).await?;
    info!(note_id = %id, "Note deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Upload an image and append its URL to the note's image list.
#[instrument(skip_all, fields(subsystem = "api", op = "attach_image", user_id = %session.user_id()))]
pub async fn attach_image(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("image") {
            image = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("No image provided".to_string()))?;

    // Ownership is verified by the store-level conditional update, but the
    // upload happens first; a forged request still costs one orphaned upload.
    let url = state.media.upload(MediaKind::Image, &image).await?;
    let note = state.notes.attach_image(id, session.user_id(), &url).await?;

    info!(note_id = %id, image_count = note.images.len(), "Image attached");
    Ok(Json(note))
}

#[derive(Deserialize)]
pub struct DetachQuery {
    index: Option<usize>,
}

/// Remove an image by positional index. Out-of-range indexes are rejected.
#[instrument(skip_all, fields(subsystem = "api", op = "detach_image", user_id = %session.user_id()))]
pub async fn detach_image(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Query(query): Query<DetachQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let index = query
        .index
        .ok_or_else(|| ApiError::BadRequest("Image index required".to_string()))?;

    let note = state
        .notes
        .detach_image(id, session.user_id(), index)
        .await?;

    info!(note_id = %id, image_count = note.images.len(), "Image detached");
    Ok(Json(note))
}
