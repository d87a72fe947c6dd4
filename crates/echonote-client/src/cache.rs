//! Local note cache backing the dashboard.
//!
//! The server is the source of truth; the cache holds the last fetched list,
//! applies server-confirmed mutations in place, and answers search/sort
//! queries without a round trip. A JSON file mirror makes the last known
//! list available across restarts as a display cache only.

use std::path::Path;

use echonote_core::{Note, NoteType, Result};
use uuid::Uuid;

/// Sort dimension for the dashboard list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Creation timestamp.
    Date,
    /// Case-insensitive title.
    Title,
    /// Note kind, text before audio.
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// In-memory list of the session user's notes.
#[derive(Debug, Clone, Default)]
pub struct NoteCache {
    notes: Vec<Note>,
}

impl NoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache with a freshly fetched list.
    pub fn replace(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Prepend a server-confirmed new note (the list is newest-first).
    pub fn apply_created(&mut self, note: Note) {
        self.notes.insert(0, note);
    }

    /// Replace the cached copy of a server-confirmed updated note.
    /// Unknown ids are appended; the server copy wins either way.
    pub fn apply_updated(&mut self, note: Note) {
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(slot) => *slot = note,
            None => self.notes.push(note),
        }
    }

    /// Drop a server-confirmed deleted note. Unknown ids are a no-op.
    pub fn apply_deleted(&mut self, id: Uuid) {
        self.notes.retain(|n| n.id != id);
    }

    /// Case-insensitive search over title, description, and transcript.
    ///
    /// The query is split on whitespace and every term must match somewhere
    /// in the note (AND semantics), so term order never changes the result.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            return self.notes.iter().collect();
        }

        self.notes
            .iter()
            .filter(|note| {
                let haystack = format!(
                    "{} {} {}",
                    note.title,
                    note.description,
                    note.transcript.as_deref().unwrap_or("")
                )
                .to_lowercase();
                terms.iter().all(|term| haystack.contains(term.as_str()))
            })
            .collect()
    }

    /// Sorted copy of the cached notes.
    pub fn sorted(&self, key: SortKey, order: SortOrder) -> Vec<Note> {
        let mut notes = self.notes.clone();
        notes.sort_by(|a, b| {
            let cmp = match key {
                SortKey::Date => a.created_at.cmp(&b.created_at),
                SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SortKey::Type => type_rank(a.note_type).cmp(&type_rank(b.note_type)),
            };
            match order {
                SortOrder::Ascending => cmp,
                SortOrder::Descending => cmp.reverse(),
            }
        });
        notes
    }

    /// Write the cached list to a JSON mirror file.
    pub fn save_mirror(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.notes)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved mirror. A missing file yields an empty cache,
    /// not an error; the next fetch overwrites it anyway.
    pub fn load_mirror(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let notes: Vec<Note> = serde_json::from_str(&json)?;
        Ok(Self { notes })
    }
}

fn type_rank(t: NoteType) -> u8 {
    match t {
        NoteType::Text => 0,
        NoteType::Audio => 1,
    }
}
