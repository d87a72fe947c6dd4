//! Note repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use echonote_core::{
    display_date, display_time, CreateAudioNoteRequest, CreateTextNoteRequest, Error, Note,
    NoteRepository, NoteType, Result, TranscriptionState, UpdateNoteRequest,
};

const NOTE_COLUMNS: &str = "id, user_id, title, description, note_type, transcript, audio_url, \
     images, duration, date, time, is_favorite, transcription_state, created_at";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_row(&self, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {} FROM note WHERE id = $1", NOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(map_row).transpose()
    }

    /// Fetch and verify ownership, mapping a mismatch to Forbidden.
    async fn fetch_owned(&self, id: Uuid, user_id: &str) -> Result<Note> {
        let note = self.fetch_row(id).await?.ok_or(Error::NoteNotFound(id))?;
        if note.user_id != user_id {
            return Err(Error::Forbidden(format!(
                "note {} is not owned by the session user",
                id
            )));
        }
        Ok(note)
    }

    /// Disambiguate a zero-row image mutation: the note is missing, foreign,
    /// or (for detach) the index was out of range.
    async fn explain_failed_image_update(
        &self,
        id: Uuid,
        user_id: &str,
        index: Option<usize>,
    ) -> Error {
        match self.fetch_row(id).await {
            Ok(None) => Error::NoteNotFound(id),
            Ok(Some(note)) if note.user_id != user_id => Error::Forbidden(format!(
                "note {} is not owned by the session user",
                id
            )),
            Ok(Some(note)) => match index {
                Some(i) => Error::InvalidInput(format!(
                    "image index {} out of range for note with {} images",
                    i,
                    note.images.len()
                )),
                None => Error::Internal(format!("image update on note {} affected no rows", id)),
            },
            Err(e) => e,
        }
    }
}

fn map_row(row: PgRow) -> Result<Note> {
    let note_type: String = row.get("note_type");
    let note_type = NoteType::parse(&note_type)
        .ok_or_else(|| Error::Internal(format!("unknown note_type in store: {}", note_type)))?;

    let state: String = row.get("transcription_state");
    let transcription_state = TranscriptionState::parse(&state).ok_or_else(|| {
        Error::Internal(format!("unknown transcription_state in store: {}", state))
    })?;

    Ok(Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        note_type,
        transcript: row.get("transcript"),
        audio_url: row.get("audio_url"),
        images: row.get("images"),
        duration: row.get("duration"),
        date: row.get("date"),
        time: row.get("time"),
        is_favorite: row.get("is_favorite"),
        transcription_state,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert_text(&self, user_id: &str, req: CreateTextNoteRequest) -> Result<Note> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO note (id, user_id, title, description, note_type, date, time, \
                 is_favorite, transcription_state, created_at)
             VALUES ($1, $2, $3, $4, 'text', $5, $6, false, 'completed', $7)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(req.title.unwrap_or_else(|| "Text Note".to_string()))
        .bind(req.description)
        .bind(display_date(now))
        .bind(display_time(now))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        map_row(row)
    }

    async fn insert_audio(&self, user_id: &str, req: CreateAudioNoteRequest) -> Result<Note> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO note (id, user_id, title, description, note_type, transcript, \
                 audio_url, duration, date, time, is_favorite, transcription_state, created_at)
             VALUES ($1, $2, $3, $4, 'audio', $5, $6, $7, $8, $9, false, 'completed', $10)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(req.title.unwrap_or_else(|| "Audio Note".to_string()))
        .bind(req.description)
        .bind(req.transcript)
        .bind(req.audio_url)
        .bind(req.duration)
        .bind(display_date(now))
        .bind(display_time(now))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        map_row(row)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        self.fetch_row(id).await?.ok_or(Error::NoteNotFound(id))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM note WHERE user_id = $1 ORDER BY created_at DESC",
            NOTE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_row).collect()
    }

    async fn update(&self, id: Uuid, user_id: &str, req: UpdateNoteRequest) -> Result<Note> {
        // Ownership check first; the shallow merge itself is a single statement.
        let current = self.fetch_owned(id, user_id).await?;
        if req.is_empty() {
            return Ok(current);
        }

        let row = sqlx::query(&format!(
            "UPDATE note SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 transcript = COALESCE($4, transcript),
                 duration = COALESCE($5, duration),
                 is_favorite = COALESCE($6, is_favorite),
                 transcription_state = COALESCE($7, transcription_state)
             WHERE id = $1
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.transcript)
        .bind(req.duration)
        .bind(req.is_favorite)
        .bind(req.transcription_state.map(|s| s.as_str().to_string()))
        .fetch_one(&self.pool)
        .await?;

        map_row(row)
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<()> {
        self.fetch_owned(id, user_id).await?;
        // No cascading media cleanup: orphaned uploads are accepted.
        sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn attach_image(&self, id: Uuid, user_id: &str, url: &str) -> Result<Note> {
        // Atomic append; no client-computed array splicing.
        let row = sqlx::query(&format!(
            "UPDATE note SET images = array_append(images, $3)
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row(row),
            None => Err(self.explain_failed_image_update(id, user_id, None).await),
        }
    }

    async fn detach_image(&self, id: Uuid, user_id: &str, index: usize) -> Result<Note> {
        let idx = i32::try_from(index)
            .map_err(|_| Error::InvalidInput(format!("image index {} out of range", index)))?;

        // Atomic slice-concatenation removal; the cardinality guard makes an
        // out-of-range index update zero rows instead of silently succeeding.
        let row = sqlx::query(&format!(
            "UPDATE note SET images = images[1:$3] || images[($3 + 2):]
             WHERE id = $1 AND user_id = $2 AND cardinality(images) > $3
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(idx)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row(row),
            None => {
                Err(self
                    .explain_failed_image_update(id, user_id, Some(index))
                    .await)
            }
        }
    }
}
