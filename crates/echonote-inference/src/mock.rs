//! Mock generation backend for deterministic testing.
//!
//! Records every prompt so tests can assert that the collaborator was (or was
//! not) called, and returns configurable canned responses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use echonote_core::{Error, GenerationBackend, Result};

#[derive(Debug, Default)]
struct MockState {
    prompts: Vec<String>,
    fixed_responses: HashMap<String, String>,
    default_response: Option<String>,
    fail: bool,
    empty: bool,
}

/// Mock generation backend.
#[derive(Clone, Default)]
pub struct MockGenerationBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response returned for prompts without a specific mapping.
    pub fn with_fixed_response(self, response: impl Into<String>) -> Self {
        self.state.lock().unwrap().default_response = Some(response.into());
        self
    }

    /// Add a response mapping for a specific prompt.
    pub fn with_response_mapping(
        self,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .fixed_responses
            .insert(prompt.into(), response.into());
        self
    }

    /// Make every subsequent call fail.
    pub fn with_failure(self) -> Self {
        self.state.lock().unwrap().fail = true;
        self
    }

    /// Simulate the collaborator returning no content.
    pub fn with_empty_completion(self) -> Self {
        self.state.lock().unwrap().empty = true;
        self
    }

    /// All prompts received so far, for assertion.
    pub fn prompts(&self) -> Vec<String> {
        self.state.lock().unwrap().prompts.clone()
    }

    /// Number of generation calls made.
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().prompts.len()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.prompts.push(prompt.to_string());

        if state.fail {
            return Err(Error::Inference("mock generation failure".to_string()));
        }
        if state.empty {
            return Err(Error::Inference("no content in completion".to_string()));
        }

        if let Some(mapped) = state.fixed_responses.get(prompt) {
            return Ok(mapped.clone());
        }
        Ok(state
            .default_response
            .clone()
            .unwrap_or_else(|| format!("rewritten: {}", prompt)))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
