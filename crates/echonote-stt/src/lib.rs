//! # echonote-stt
//!
//! Speech-to-text for echonote.
//!
//! The browser's built-in recognizer has no server-side equivalent, so the
//! capability is an explicit interface here: submit audio, receive text. Two
//! granularities are offered:
//!
//! - [`TranscriptionBackend`]: one-shot transcription of a complete buffer
//!   (Whisper-compatible HTTP backend included).
//! - [`session::RecognizerSession`]: a per-recording session that accepts
//!   audio chunks and yields a lazy sequence of transcript segments.
//!   Restartable per session, not resumable mid-session.

pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use echonote_core::{defaults, Error, Result};

pub use session::{RecognizerEvent, RecognizerSession, TranscriptSegment};

/// Result of one-shot audio transcription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionResult {
    /// Full transcribed text.
    pub full_text: String,
    /// Detected language (ISO 639-1 code).
    pub language: Option<String>,
    /// Total audio duration in seconds.
    pub duration_secs: Option<f64>,
}

/// Backend for transcribing audio buffers.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe audio data.
    async fn transcribe(
        &self,
        audio_data: &[u8],
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResult>;

    /// Check if the transcription backend is available.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible Whisper backend (works with Speaches/faster-whisper-server).
pub struct WhisperBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl WhisperBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
            timeout_secs: defaults::WHISPER_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables.
    /// Returns None if WHISPER_BASE_URL is not set.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var(defaults::ENV_WHISPER_BASE_URL).ok()?;
        if base_url.is_empty() {
            return None;
        }
        let model = std::env::var(defaults::ENV_WHISPER_MODEL)
            .unwrap_or_else(|_| defaults::WHISPER_MODEL.to_string());
        Some(Self::new(base_url, model))
    }
}

/// Whisper API response format.
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

#[async_trait]
impl TranscriptionBackend for WhisperBackend {
    async fn transcribe(
        &self,
        audio_data: &[u8],
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResult> {
        let url = format!("{}/v1/audio/transcriptions", self.base_url);

        // Determine file extension from MIME type
        let ext = match mime_type {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/ogg" => "ogg",
            "audio/flac" => "flac",
            "audio/webm" => "webm",
            _ => "wav",
        };

        let file_part = reqwest::multipart::Part::bytes(audio_data.to_vec())
            .file_name(format!("audio.{}", ext))
            .mime_str(mime_type)
            .map_err(|e| Error::Transcription(format!("failed to create multipart: {}", e)))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("transcription request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Whisper API returned {}: {}",
                status, body
            )));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            Error::Transcription(format!("failed to parse whisper response: {}", e))
        })?;

        Ok(TranscriptionResult {
            full_text: result.text,
            language: result.language,
            duration_secs: result.duration,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whisper_backend_new() {
        let backend =
            WhisperBackend::new("http://localhost:8000".to_string(), "whisper-1".to_string());
        assert_eq!(backend.base_url, "http://localhost:8000");
        assert_eq!(backend.model, "whisper-1");
        assert_eq!(backend.timeout_secs, defaults::WHISPER_TIMEOUT_SECS);
        assert_eq!(backend.model_name(), "whisper-1");
    }

    #[test]
    fn test_whisper_response_deserialization() {
        let json = r#"{
            "text": "Hello world",
            "language": "en",
            "duration": 5.0
        }"#;

        let response: WhisperResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text, "Hello world");
        assert_eq!(response.language.as_deref(), Some("en"));
        assert_eq!(response.duration, Some(5.0));
    }

    #[test]
    fn test_whisper_response_deserialization_minimal() {
        let json = r#"{"text": "Hello world"}"#;

        let response: WhisperResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text, "Hello world");
        assert!(response.language.is_none());
        assert!(response.duration.is_none());
    }

    #[test]
    fn test_transcription_result_serialization() {
        let result = TranscriptionResult {
            full_text: "Hello world.".to_string(),
            language: Some("en".to_string()),
            duration_secs: Some(5.0),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["full_text"], "Hello world.");
        assert_eq!(json["language"], "en");
        assert_eq!(json["duration_secs"], 5.0);

        let deserialized: TranscriptionResult = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, result);
    }
}
