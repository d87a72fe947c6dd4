//! Mock media store for deterministic testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use echonote_core::{Error, MediaKind, MediaStore, Result};

/// A recorded upload call.
#[derive(Debug, Clone)]
pub struct MockUpload {
    pub kind: MediaKind,
    pub bytes: usize,
}

/// In-memory MediaStore that fabricates durable URLs and logs every call.
#[derive(Clone, Default)]
pub struct MockMediaStore {
    uploads: Arc<Mutex<Vec<MockUpload>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail, for error-path tests.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// All logged upload calls, for assertion.
    pub fn uploads(&self) -> Vec<MockUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, kind: MediaKind, data: &[u8]) -> Result<String> {
        if *self.fail.lock().unwrap() {
            return Err(Error::Upload("mock upload failure".to_string()));
        }

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(MockUpload {
            kind,
            bytes: data.len(),
        });
        let n = uploads.len();

        let (folder, ext) = match kind {
            MediaKind::Audio => ("audio-notes", "webm"),
            MediaKind::Image => ("note-images", "jpg"),
        };
        Ok(format!("https://cdn.test/{}/upload-{}.{}", folder, n, ext))
    }
}
