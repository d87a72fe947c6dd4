//! # echonote-inference
//!
//! Text generation collaborator client for echonote.
//!
//! This crate provides:
//! - `ChatCompletionsBackend`: an OpenAI-compatible chat completions client
//!   (the transform endpoint's hosted LLM)
//! - `MockGenerationBackend`: a deterministic, call-recording mock for tests
//!
//! Every transform call is a fresh external round trip: no retry, no
//! streaming, no prompt caching.

pub mod chat;
pub mod mock;

// Re-export core types
pub use echonote_core::*;

pub use chat::ChatCompletionsBackend;
pub use mock::MockGenerationBackend;
