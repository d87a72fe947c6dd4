//! Incremental recognizer sessions.
//!
//! A session accepts audio chunks while a recording is in progress and yields
//! transcript segments as each chunk is transcribed. Sessions are restartable
//! (start a new one per recording) but not resumable: once stopped, a session
//! is finished and pushing more audio fails.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use echonote_core::{Error, Result};

use crate::TranscriptionBackend;

/// One finalized piece of transcript text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Position of the source chunk within the session, starting at 0.
    pub index: u64,
    pub text: String,
}

/// Event emitted by a recognizer session.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerEvent {
    /// A chunk was transcribed.
    Segment(TranscriptSegment),
    /// A chunk failed to transcribe; the session keeps going.
    Error { index: u64, message: String },
}

/// Depth of the audio and event channels. A stalled consumer backpressures
/// the producer instead of buffering unboundedly.
const CHANNEL_DEPTH: usize = 32;

/// A single recording session against a transcription backend.
pub struct RecognizerSession {
    audio_tx: Option<mpsc::Sender<Vec<u8>>>,
    event_rx: mpsc::Receiver<RecognizerEvent>,
}

impl RecognizerSession {
    /// Start a new session. Chunks pushed via [`push_chunk`](Self::push_chunk)
    /// are transcribed in order; events arrive via [`next_event`](Self::next_event).
    pub fn start(backend: Arc<dyn TranscriptionBackend>, mime_type: &str) -> Self {
        let (audio_tx, mut audio_rx) = mpsc::channel::<Vec<u8>>(CHANNEL_DEPTH);
        let (event_tx, event_rx) = mpsc::channel::<RecognizerEvent>(CHANNEL_DEPTH);
        let mime_type = mime_type.to_string();

        tokio::spawn(async move {
            let mut index: u64 = 0;
            while let Some(chunk) = audio_rx.recv().await {
                let event = match backend.transcribe(&chunk, &mime_type, None).await {
                    Ok(result) => {
                        debug!(
                            subsystem = "stt",
                            component = "recognizer",
                            op = "transcribe",
                            segment_index = index,
                            response_len = result.full_text.len(),
                            "Chunk transcribed"
                        );
                        RecognizerEvent::Segment(TranscriptSegment {
                            index,
                            text: result.full_text,
                        })
                    }
                    Err(e) => {
                        warn!(
                            subsystem = "stt",
                            component = "recognizer",
                            op = "transcribe",
                            segment_index = index,
                            error = %e,
                            "Chunk transcription failed"
                        );
                        RecognizerEvent::Error {
                            index,
                            message: e.to_string(),
                        }
                    }
                };
                index += 1;
                if event_tx.send(event).await.is_err() {
                    break; // consumer went away
                }
            }
            // Input closed: the event channel closes when event_tx drops,
            // which is how the consumer observes end-of-session.
        });

        Self {
            audio_tx: Some(audio_tx),
            event_rx,
        }
    }

    /// Submit an audio chunk. Fails once the session has been stopped.
    pub async fn push_chunk(&self, chunk: Vec<u8>) -> Result<()> {
        let tx = self
            .audio_tx
            .as_ref()
            .ok_or_else(|| Error::Transcription("session already stopped".to_string()))?;
        tx.send(chunk)
            .await
            .map_err(|_| Error::Transcription("recognizer task ended".to_string()))
    }

    /// Stop accepting audio. Segments already queued still arrive; after the
    /// last one, [`next_event`](Self::next_event) returns `None`.
    pub fn stop(&mut self) {
        self.audio_tx.take();
    }

    /// Whether the session still accepts audio.
    pub fn is_active(&self) -> bool {
        self.audio_tx.is_some()
    }

    /// Receive the next event. `None` means the session has ended.
    pub async fn next_event(&mut self) -> Option<RecognizerEvent> {
        self.event_rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TranscriptionResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that echoes chunk sizes, failing on empty chunks.
    struct EchoBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranscriptionBackend for EchoBackend {
        async fn transcribe(
            &self,
            audio_data: &[u8],
            _mime_type: &str,
            _language: Option<&str>,
        ) -> echonote_core::Result<TranscriptionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if audio_data.is_empty() {
                return Err(Error::Transcription("empty chunk".to_string()));
            }
            Ok(TranscriptionResult {
                full_text: format!("chunk of {} bytes", audio_data.len()),
                language: None,
                duration_secs: None,
            })
        }

        async fn health_check(&self) -> echonote_core::Result<bool> {
            Ok(true)
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_session_yields_segments_in_order() {
        let backend = Arc::new(EchoBackend {
            calls: AtomicUsize::new(0),
        });
        let mut session = RecognizerSession::start(backend, "audio/webm");

        session.push_chunk(vec![0; 3]).await.unwrap();
        session.push_chunk(vec![0; 7]).await.unwrap();
        session.stop();

        let first = session.next_event().await.unwrap();
        assert_eq!(
            first,
            RecognizerEvent::Segment(TranscriptSegment {
                index: 0,
                text: "chunk of 3 bytes".to_string(),
            })
        );
        let second = session.next_event().await.unwrap();
        assert_eq!(
            second,
            RecognizerEvent::Segment(TranscriptSegment {
                index: 1,
                text: "chunk of 7 bytes".to_string(),
            })
        );
        // End of session after stop.
        assert_eq!(session.next_event().await, None);
    }

    #[tokio::test]
    async fn test_session_reports_chunk_errors_and_continues() {
        let backend = Arc::new(EchoBackend {
            calls: AtomicUsize::new(0),
        });
        let mut session = RecognizerSession::start(backend, "audio/webm");

        session.push_chunk(vec![]).await.unwrap();
        session.push_chunk(vec![0; 2]).await.unwrap();
        session.stop();

        match session.next_event().await.unwrap() {
            RecognizerEvent::Error { index, message } => {
                assert_eq!(index, 0);
                assert!(message.contains("empty chunk"));
            }
            other => panic!("expected error event, got {:?}", other),
        }
        assert!(matches!(
            session.next_event().await.unwrap(),
            RecognizerEvent::Segment(_)
        ));
    }

    #[tokio::test]
    async fn test_stopped_session_rejects_audio() {
        let backend = Arc::new(EchoBackend {
            calls: AtomicUsize::new(0),
        });
        let mut session = RecognizerSession::start(backend, "audio/webm");
        assert!(session.is_active());

        session.stop();
        assert!(!session.is_active());

        let err = session.push_chunk(vec![1]).await.unwrap_err();
        assert!(matches!(err, Error::Transcription(_)));
    }
}
