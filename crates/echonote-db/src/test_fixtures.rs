//! Test fixtures shared by integration tests.
//!
//! `MemoryNoteRepository` mirrors `PgNoteRepository` semantics (ownership
//! checks, atomic image mutation, out-of-range rejection) without a running
//! PostgreSQL, so API-level tests can drive the router in-process.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use echonote_core::{
    display_date, display_time, CreateAudioNoteRequest, CreateTextNoteRequest, Error, Note,
    NoteRepository, NoteType, Result, TranscriptionState, UpdateNoteRequest,
};

/// In-memory implementation of NoteRepository.
#[derive(Clone, Default)]
pub struct MemoryNoteRepository {
    notes: Arc<Mutex<Vec<Note>>>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored note, for assertions.
    pub fn all(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }

    /// Seed a pre-built note (bypasses create validation).
    pub fn seed(&self, note: Note) {
        self.notes.lock().unwrap().push(note);
    }

    fn new_note(user_id: &str, title: String, note_type: NoteType) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title,
            description: String::new(),
            note_type,
            transcript: None,
            audio_url: None,
            images: Vec::new(),
            duration: None,
            date: display_date(now),
            time: display_time(now),
            is_favorite: false,
            transcription_state: TranscriptionState::Completed,
            created_at: now,
        }
    }

    fn owned_position(notes: &[Note], id: Uuid, user_id: &str) -> Result<usize> {
        let pos = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        if notes[pos].user_id != user_id {
            return Err(Error::Forbidden(format!(
                "note {} is not owned by the session user",
                id
            )));
        }
        Ok(pos)
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn insert_text(&self, user_id: &str, req: CreateTextNoteRequest) -> Result<Note> {
        let mut note = Self::new_note(
            user_id,
            req.title.unwrap_or_else(|| "Text Note".to_string()),
            NoteType::Text,
        );
        note.description = req.description;

        self.notes.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn insert_audio(&self, user_id: &str, req: CreateAudioNoteRequest) -> Result<Note> {
        let mut note = Self::new_note(
            user_id,
            req.title.unwrap_or_else(|| "Audio Note".to_string()),
            NoteType::Audio,
        );
        note.description = req.description;
        note.transcript = Some(req.transcript);
        note.audio_url = Some(req.audio_url);
        note.duration = req.duration;

        self.notes.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn update(&self, id: Uuid, user_id: &str, req: UpdateNoteRequest) -> Result<Note> {
        let mut notes = self.notes.lock().unwrap();
        let pos = Self::owned_position(&notes, id, user_id)?;
        let note = &mut notes[pos];

        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(description) = req.description {
            note.description = description;
        }
        if let Some(transcript) = req.transcript {
            note.transcript = Some(transcript);
        }
        if let Some(duration) = req.duration {
            note.duration = Some(duration);
        }
        if let Some(fav) = req.is_favorite {
            note.is_favorite = fav;
        }
        if let Some(state) = req.transcription_state {
            note.transcription_state = state;
        }

        Ok(note.clone())
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<()> {
        let mut notes = self.notes.lock().unwrap();
        let pos = Self::owned_position(&notes, id, user_id)?;
        notes.remove(pos);
        Ok(())
    }

    async fn attach_image(&self, id: Uuid, user_id: &str, url: &str) -> Result<Note> {
        let mut notes = self.notes.lock().unwrap();
        let pos = Self::owned_position(&notes, id, user_id)?;
        notes[pos].images.push(url.to_string());
        Ok(notes[pos].clone())
    }

    async fn detach_image(&self, id: Uuid, user_id: &str, index: usize) -> Result<Note> {
        let mut notes = self.notes.lock().unwrap();
        let pos = Self::owned_position(&notes, id, user_id)?;
        if index >= notes[pos].images.len() {
            return Err(Error::InvalidInput(format!(
                "image index {} out of range for note with {} images",
                index,
                notes[pos].images.len()
            )));
        }
        notes[pos].images.remove(index);
        Ok(notes[pos].clone())
    }
}
