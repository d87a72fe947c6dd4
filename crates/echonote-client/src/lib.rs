//! echonote-client - client-side layer for the note service.
//!
//! Typed API client, local note cache with search/sort and a JSON mirror,
//! the voice assistant state machine, and the recording clock formatter.
//! Speech capture itself lives in `echonote-stt`; this crate consumes its
//! finalized transcripts.

pub mod api;
pub mod assistant;
pub mod cache;

pub use api::{ApiClient, AudioNoteUpload};
pub use assistant::{AssistantAction, ListenState, NavigationSink, VoiceAssistant};
pub use cache::{NoteCache, SortKey, SortOrder};

// Re-export shared types for convenience.
pub use echonote_core::{CreateTextNoteRequest, Note, UpdateNoteRequest};

/// Format elapsed recording seconds as "mm:ss".
///
/// Minutes are not capped at 59; an hour-long recording reads "60:00".
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(7), "00:07");
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(600), "10:00");
        assert_eq!(format_duration(3600), "60:00");
    }
}
