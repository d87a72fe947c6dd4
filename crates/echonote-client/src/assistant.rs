//! Voice assistant state machine.
//!
//! One recognition session at a time: toggling while idle starts listening,
//! toggling while listening stops. The recognizer ending on its own, or
//! failing, also drops back to idle — overlapping commands are never queued.
//!
//! Finalized transcripts are dispatched through the phrase tables. Navigation
//! commands go to the local [`NavigationSink`] and never touch the network;
//! tone/format/edit matches are returned to the caller, who runs the
//! transformation through [`crate::ApiClient::transform_note`].

use tracing::{info, warn};

use echonote_commands::{match_transcript, CommandCategory};
use echonote_core::{Error, Result};
use echonote_stt::{RecognizerEvent, RecognizerSession};

/// Local handler for navigation commands (scrolling, caret movement).
pub trait NavigationSink: Send + Sync {
    fn navigate(&self, command: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
}

/// Outcome of dispatching one finalized transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantAction {
    /// Handled locally via the navigation sink.
    Navigated { command: &'static str },
    /// Needs a server-side transformation of the current note content.
    Transform {
        category: CommandCategory,
        command: &'static str,
    },
}

pub struct VoiceAssistant<S: NavigationSink> {
    state: ListenState,
    sink: S,
}

impl<S: NavigationSink> VoiceAssistant<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: ListenState::Idle,
            sink,
        }
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListenState::Listening
    }

    /// Flip between idle and listening. Returns the new state.
    pub fn toggle(&mut self) -> ListenState {
        self.state = match self.state {
            ListenState::Idle => ListenState::Listening,
            ListenState::Listening => ListenState::Idle,
        };
        info!(subsystem = "client", state = ?self.state, "Assistant toggled");
        self.state
    }

    /// The recognizer finished its stream on its own.
    pub fn on_recognizer_end(&mut self) {
        self.state = ListenState::Idle;
    }

    /// The recognizer failed; the session is over either way.
    pub fn on_recognizer_error(&mut self, message: &str) {
        warn!(subsystem = "client", error = message, "Recognizer error");
        self.state = ListenState::Idle;
    }

    /// Dispatch a finalized transcript through the phrase tables.
    ///
    /// No match is a user-visible error, not a silent drop.
    pub fn dispatch(&self, transcript: &str) -> Result<AssistantAction> {
        let matched = match_transcript(transcript).ok_or_else(|| {
            Error::InvalidInput(format!("No matching command in: \"{}\"", transcript.trim()))
        })?;

        info!(
            subsystem = "client",
            command_category = matched.category.as_str(),
            command = matched.command,
            "Command recognized"
        );

        if matched.category == CommandCategory::Navigation {
            self.sink.navigate(matched.command);
            return Ok(AssistantAction::Navigated {
                command: matched.command,
            });
        }

        Ok(AssistantAction::Transform {
            category: matched.category,
            command: matched.command,
        })
    }

    /// Drain a recognizer session to completion, dispatching every finalized
    /// segment. A recognizer error ends the session; either way the
    /// assistant is idle afterwards.
    pub async fn run_session(
        &mut self,
        mut session: RecognizerSession,
    ) -> Vec<Result<AssistantAction>> {
        self.state = ListenState::Listening;
        let mut actions = Vec::new();

        while let Some(event) = session.next_event().await {
            match event {
                RecognizerEvent::Segment(segment) => {
                    actions.push(self.dispatch(&segment.text));
                }
                RecognizerEvent::Error { message, .. } => {
                    self.on_recognizer_error(&message);
                    return actions;
                }
            }
        }

        self.on_recognizer_end();
        actions
    }
}
