//! Typed HTTP client for the note API.
//!
//! One method per route, bearer-token auth on every call. Error bodies are
//! the server's `{"error": message}` shape; the status code decides which
//! [`Error`] variant the message lands in.

use reqwest::{multipart, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use echonote_core::{
    CreateTextNoteRequest, Error, Note, Result, UpdateNoteRequest,
};

/// Fields of an audio note upload; the binary goes as a multipart file part.
#[derive(Debug, Clone)]
pub struct AudioNoteUpload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub transcript: Option<String>,
    pub duration: Option<String>,
    pub audio: Vec<u8>,
    pub file_name: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct TransformBody {
    #[serde(rename = "transformedContent")]
    transformed_content: String,
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        Ok(response.status().is_success())
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let response = self
            .client
            .get(self.url("/notes"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        expect_json(response).await
    }

    pub async fn create_text_note(&self, req: CreateTextNoteRequest) -> Result<Note> {
        let response = self
            .client
            .post(self.url("/notes"))
            .bearer_auth(&self.token)
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        expect_json(response).await
    }

    pub async fn create_audio_note(&self, upload: AudioNoteUpload) -> Result<Note> {
        let mut form = multipart::Form::new().part(
            "audio",
            multipart::Part::bytes(upload.audio).file_name(upload.file_name),
        );
        if let Some(title) = upload.title {
            form = form.text("title", title);
        }
        if let Some(description) = upload.description {
            form = form.text("content", description);
        }
        if let Some(transcript) = upload.transcript {
            form = form.text("transcript", transcript);
        }
        if let Some(duration) = upload.duration {
            form = form.text("duration", duration);
        }

        let response = self
            .client
            .post(self.url("/notes"))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        expect_json(response).await
    }

    pub async fn update_note(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let response = self
            .client
            .patch(self.url(&format!("/notes?id={}", id)))
            .bearer_auth(&self.token)
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        expect_json(response).await
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/notes/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        expect_json::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn attach_image(
        &self,
        id: Uuid,
        file_name: impl Into<String>,
        image: Vec<u8>,
    ) -> Result<Note> {
        let form = multipart::Form::new().part(
            "image",
            multipart::Part::bytes(image).file_name(file_name.into()),
        );

        let response = self
            .client
            .post(self.url(&format!("/notes/{}/images", id)))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        expect_json(response).await
    }

    pub async fn detach_image(&self, id: Uuid, index: usize) -> Result<Note> {
        let response = self
            .client
            .delete(self.url(&format!("/notes/{}/images?index={}", id, index)))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        expect_json(response).await
    }

    /// Rewrite content via the server-side generation backend.
    pub async fn transform_note(
        &self,
        content: &str,
        category: &str,
        command: &str,
    ) -> Result<String> {
        debug!(
            subsystem = "client",
            command_category = category,
            command = command,
            "Requesting transformation"
        );

        let response = self
            .client
            .post(self.url("/transform-note"))
            .bearer_auth(&self.token)
            .json(&json!({
                "content": content,
                "type": category,
                "command": command,
            }))
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let body: TransformBody = expect_json(response).await?;
        Ok(body.transformed_content)
    }
}

async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()));
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("HTTP {}", status));

    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        StatusCode::FORBIDDEN => Error::Forbidden(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::BAD_REQUEST => Error::InvalidInput(message),
        _ => Error::Internal(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:3000/", "tok");
        assert_eq!(client.url("/notes"), "http://localhost:3000/notes");
    }

    #[test]
    fn test_transform_body_parses_wire_name() {
        let body: TransformBody =
            serde_json::from_str(r#"{"transformedContent": "Better."}"#).unwrap();
        assert_eq!(body.transformed_content, "Better.");
    }

    #[test]
    fn test_update_request_serializes_only_set_fields() {
        let req = UpdateNoteRequest {
            is_favorite: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "isFavorite": true }));
    }
}
