//! Domain models for echonote.
//!
//! One canonical schema: `type` and `transcriptionState` are the wire names
//! (the historical `contentType`/`transcriptionStatus` duplicates are gone).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of note content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Text,
    Audio,
}

impl NoteType {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Text => "text",
            NoteType::Audio => "audio",
        }
    }

    /// Parse the database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(NoteType::Text),
            "audio" => Some(NoteType::Audio),
            _ => None,
        }
    }
}

/// Lifecycle state of an audio note's transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionState {
    Pending,
    Completed,
    Failed,
}

impl TranscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionState::Pending => "pending",
            TranscriptionState::Completed => "completed",
            TranscriptionState::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TranscriptionState::Pending),
            "completed" => Some(TranscriptionState::Completed),
            "failed" => Some(TranscriptionState::Failed),
            _ => None,
        }
    }
}

/// A note record as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    /// Owning user. Mutating operations must verify this against the session.
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Ordered image URLs; appended by attach, index-addressed by detach.
    #[serde(default)]
    pub images: Vec<String>,
    /// Formatted mm:ss recording length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Display-formatted date, e.g. "Aug 23, 2026".
    pub date: String,
    /// Display-formatted time, e.g. "3:05 PM".
    pub time: String,
    pub is_favorite: bool,
    pub transcription_state: TranscriptionState,
    pub created_at: DateTime<Utc>,
}

/// Opaque identity resolved from the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
}

/// Request for creating a text note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTextNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
}

/// Request for creating an audio note (from multipart form fields).
#[derive(Debug, Clone)]
pub struct CreateAudioNoteRequest {
    pub title: Option<String>,
    pub description: String,
    pub transcript: String,
    /// Durable URL returned by the media collaborator.
    pub audio_url: String,
    pub duration: Option<String>,
}

/// Partial update applied as a shallow merge. Absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription_state: Option<TranscriptionState>,
}

impl UpdateNoteRequest {
    /// True when no field is set; such a PATCH is a no-op read.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.transcript.is_none()
            && self.duration.is_none()
            && self.is_favorite.is_none()
            && self.transcription_state.is_none()
    }
}

/// Format a timestamp the way the dashboard displays dates: "Aug 23, 2026".
pub fn display_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Format a timestamp the way the dashboard displays times: "3:05 PM".
pub fn display_time(ts: DateTime<Utc>) -> String {
    ts.format("%-I:%M %p").to_string()
}
