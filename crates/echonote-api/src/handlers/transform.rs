//! Note transformation handler.
//!
//! Maps a (category, command) pair to its fixed instruction sentence, builds
//! the prompt, and delegates to the generation backend. All validation happens
//! before the backend is called, so an invalid request never spends a
//! completion.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::{info, instrument};

use echonote_commands::{build_prompt, instruction_for, CommandCategory};

use crate::{ApiError, AppState, Session};

#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub command: Option<String>,
}

/// Rewrite note content according to a recognized voice command.
#[instrument(skip_all, fields(subsystem = "api", op = "transform_note", user_id = %session.user_id()))]
pub async fn transform_note(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<TransformRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Note content required".to_string()))?;

    let category = req
        .category
        .as_deref()
        .and_then(parse_transform_category)
        .ok_or_else(|| ApiError::BadRequest("Unknown transformation type".to_string()))?;

    let command = req
        .command
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Command required".to_string()))?;

    let instruction = instruction_for(category, command).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unknown {} command: {}",
            category.as_str(),
            command
        ))
    })?;

    let prompt = build_prompt(instruction, content);
    let transformed = state.generation.generate(&prompt).await?;

    info!(
        command_category = category.as_str(),
        command = command,
        prompt_len = prompt.len(),
        response_len = transformed.len(),
        model = state.generation.model_name(),
        "Note transformed"
    );

    Ok(Json(serde_json::json!({
        "transformedContent": transformed,
    })))
}

/// Only the three content-rewriting categories are valid here; navigation
/// commands never reach this endpoint.
fn parse_transform_category(raw: &str) -> Option<CommandCategory> {
    match raw {
        "tone" => Some(CommandCategory::Tone),
        "format" => Some(CommandCategory::Format),
        "edit" => Some(CommandCategory::Edit),
        _ => None,
    }
}
