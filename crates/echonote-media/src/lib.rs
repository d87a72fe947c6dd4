//! # echonote-media
//!
//! Client for the hosted media upload collaborator.
//!
//! The collaborator accepts binary buffers over signed multipart requests and
//! returns durable URLs. Audio goes to the `audio-notes` folder with automatic
//! resource-type detection; images go to `note-images`.

pub mod mock;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use echonote_core::{defaults, Error, MediaKind, MediaStore, Result};

pub use mock::MockMediaStore;

/// Media CDN upload client.
pub struct CdnMediaStore {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

/// Upload API response; only the durable URL matters to us.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CdnMediaStore {
    pub fn new(
        base_url: String,
        cloud_name: String,
        api_key: String,
        api_secret: String,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(defaults::MEDIA_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            cloud_name,
            api_key,
            api_secret,
        }
    }

    /// Create from environment variables.
    ///
    /// Fails with `Error::Config` when credentials are missing.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(defaults::ENV_MEDIA_BASE_URL)
            .unwrap_or_else(|_| defaults::MEDIA_BASE_URL.to_string());
        let cloud_name = std::env::var(defaults::ENV_MEDIA_CLOUD_NAME).map_err(|_| {
            Error::Config(format!("{} is not set", defaults::ENV_MEDIA_CLOUD_NAME))
        })?;
        let api_key = std::env::var(defaults::ENV_MEDIA_API_KEY)
            .map_err(|_| Error::Config(format!("{} is not set", defaults::ENV_MEDIA_API_KEY)))?;
        let api_secret = std::env::var(defaults::ENV_MEDIA_API_SECRET).map_err(|_| {
            Error::Config(format!("{} is not set", defaults::ENV_MEDIA_API_SECRET))
        })?;

        Ok(Self::new(base_url, cloud_name, api_key, api_secret))
    }

    fn folder(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Audio => defaults::MEDIA_AUDIO_FOLDER,
            MediaKind::Image => defaults::MEDIA_IMAGE_FOLDER,
        }
    }

    /// Resource type path segment: audio rides the CDN's auto-detection.
    fn resource_type(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Audio => "auto",
            MediaKind::Image => "image",
        }
    }

    /// SHA-256 request signature over the sorted non-file parameters.
    fn sign(&self, folder: &str, timestamp: i64) -> String {
        let to_sign = format!("folder={}&timestamp={}{}", folder, timestamp, self.api_secret);
        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaStore for CdnMediaStore {
    async fn upload(&self, kind: MediaKind, data: &[u8]) -> Result<String> {
        let folder = Self::folder(kind);
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(folder, timestamp);

        let url = format!(
            "{}/v1_1/{}/{}/upload",
            self.base_url,
            self.cloud_name,
            Self::resource_type(kind)
        );

        debug!(
            subsystem = "media",
            component = "cdn",
            op = "upload",
            media_bytes = data.len(),
            folder = folder,
            "Uploading media buffer"
        );

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(data.to_vec()))
            .text("folder", folder.to_string())
            .text("timestamp", timestamp.to_string())
            .text("api_key", self.api_key.clone())
            .text("signature", signature);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "upload API returned {}: {}",
                status, body
            )));
        }

        let result: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Upload(format!("failed to parse upload response: {}", e)))?;

        info!(
            subsystem = "media",
            component = "cdn",
            op = "upload",
            media_bytes = data.len(),
            folder = folder,
            "Media upload complete"
        );

        Ok(result.secure_url)
    }
}
