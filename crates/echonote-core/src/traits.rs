//! Core traits for echonote abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for note CRUD operations.
///
/// Ownership is *not* enforced here; callers pass the session's user id and
/// the repository fails with `Error::Forbidden` on mismatch so the check
/// happens exactly once per operation, next to the data.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a text note. Returns the stored record.
    async fn insert_text(&self, user_id: &str, req: CreateTextNoteRequest) -> Result<Note>;

    /// Insert an audio note whose media is already uploaded.
    async fn insert_audio(&self, user_id: &str, req: CreateAudioNoteRequest) -> Result<Note>;

    /// Fetch a note by id regardless of owner.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// List all notes owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Note>>;

    /// Shallow-merge update. Fails with Forbidden when `user_id` is not the owner.
    async fn update(&self, id: Uuid, user_id: &str, req: UpdateNoteRequest) -> Result<Note>;

    /// Delete a note. Fails with Forbidden when `user_id` is not the owner.
    async fn delete(&self, id: Uuid, user_id: &str) -> Result<()>;

    /// Atomically append an image URL to the note's image list.
    async fn attach_image(&self, id: Uuid, user_id: &str, url: &str) -> Result<Note>;

    /// Atomically remove the image at `index`. Out-of-range fails with InvalidInput.
    async fn detach_image(&self, id: Uuid, user_id: &str, index: usize) -> Result<Note>;
}

// =============================================================================
// COLLABORATOR BACKENDS
// =============================================================================

/// Backend for text generation (hosted LLM completion API).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Kind of media accepted by the upload collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Image,
}

/// Backend for the hosted media upload collaborator.
///
/// Accepts a binary buffer and returns a durable URL. Deleting notes does not
/// remove uploaded media; orphans are an accepted side effect.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a buffer and return its durable URL.
    async fn upload(&self, kind: MediaKind, data: &[u8]) -> Result<String>;
}
