//! Centralized default constants for the echonote system.
//!
//! **This module is the single source of truth** for shared defaults and
//! environment variable names. All crates reference these constants instead
//! of defining their own magic strings.

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/echonote";

/// Default maximum connections in the database pool.
pub const DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default timeout for acquiring a pool connection, in seconds.
pub const DATABASE_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted request body (audio/image uploads), in bytes.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const ENV_DATABASE_ACQUIRE_TIMEOUT_SECS: &str = "DATABASE_ACQUIRE_TIMEOUT_SECS";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";

/// Session token registry: comma-separated `token:user_id:display_name` triples.
pub const ENV_SESSION_TOKENS: &str = "SESSION_TOKENS";

// =============================================================================
// GENERATION COLLABORATOR
// =============================================================================

/// Default OpenAI-compatible chat completions endpoint base.
pub const GENERATION_BASE_URL: &str = "https://api.groq.com/openai";

/// Fixed generation model (spec: fixed model identifier, no selection).
pub const GENERATION_MODEL: &str = "llama-3.3-70b-versatile";

/// Fixed sampling temperature for transform requests.
pub const GENERATION_TEMPERATURE: f64 = 0.7;

/// Fixed completion token cap for transform requests.
pub const GENERATION_MAX_TOKENS: u32 = 1000;

/// Timeout for generation requests (seconds).
pub const GENERATION_TIMEOUT_SECS: u64 = 60;

pub const ENV_GENERATION_BASE_URL: &str = "GENERATION_BASE_URL";
pub const ENV_GENERATION_API_KEY: &str = "GENERATION_API_KEY";
pub const ENV_GENERATION_MODEL: &str = "GENERATION_MODEL";

// =============================================================================
// MEDIA COLLABORATOR
// =============================================================================

/// Default media CDN API base.
pub const MEDIA_BASE_URL: &str = "https://api.cloudinary.com";

/// Upload folder for audio notes.
pub const MEDIA_AUDIO_FOLDER: &str = "audio-notes";

/// Upload folder for note images.
pub const MEDIA_IMAGE_FOLDER: &str = "note-images";

/// Timeout for media uploads (seconds).
pub const MEDIA_TIMEOUT_SECS: u64 = 120;

pub const ENV_MEDIA_BASE_URL: &str = "MEDIA_BASE_URL";
pub const ENV_MEDIA_CLOUD_NAME: &str = "MEDIA_CLOUD_NAME";
pub const ENV_MEDIA_API_KEY: &str = "MEDIA_API_KEY";
pub const ENV_MEDIA_API_SECRET: &str = "MEDIA_API_SECRET";

// =============================================================================
// TRANSCRIPTION COLLABORATOR
// =============================================================================

/// Default Whisper-compatible transcription model.
pub const WHISPER_MODEL: &str = "Systran/faster-whisper-large-v3";

/// Timeout for transcription requests (seconds). Long audio takes a while.
pub const WHISPER_TIMEOUT_SECS: u64 = 300;

pub const ENV_WHISPER_BASE_URL: &str = "WHISPER_BASE_URL";
pub const ENV_WHISPER_MODEL: &str = "WHISPER_MODEL";
