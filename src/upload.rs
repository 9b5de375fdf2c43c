use std::path::{Path, PathBuf};

use spdlog::prelude::*;

use crate::api::{ClientError, ImageUpload, UploadResponse};
use crate::backend::Backend;
use crate::config::GENERIC_UPLOAD_ERROR;

/// State of the upload form on the dashboard
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<PathBuf>,
    busy: bool,
    error: Option<String>,
    result: Option<UploadResponse>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, path: impl Into<PathBuf>) {
        self.file = Some(path.into());
        self.error = None;
    }

    pub fn clear(&mut self) {
        self.file = None;
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&UploadResponse> {
        self.result.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.busy
    }

    /// Sends the selected file for extraction. Returns `None` when there is
    /// nothing to submit. The selection is cleared whatever the outcome.
    pub async fn submit<B: Backend>(&mut self, backend: &B) -> Option<&UploadResponse> {
        if !self.can_submit() {
            return None;
        }
        let path = self.file.clone()?;

        self.busy = true;
        self.result = None;
        self.error = None;

        let outcome = send(backend, &path).await;
        self.file = None;
        self.busy = false;

        match outcome {
            Ok(res) => {
                info!("Extraction finished: {}", res.message.as_deref().unwrap_or("ok"));
                self.result = Some(res);
                self.result.as_ref()
            }
            Err(err) => {
                error!("Upload of {} failed: {}", path.display(), err);
                self.error = Some(
                    err.detail()
                        .map(str::to_string)
                        .unwrap_or_else(|| GENERIC_UPLOAD_ERROR.to_string()),
                );
                None
            }
        }
    }
}

async fn send<B: Backend>(backend: &B, path: &Path) -> Result<UploadResponse, ClientError> {
    let image = ImageUpload::from_path(path).await?;
    backend.upload_image(image).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use std::io::Write;
    use std::sync::atomic::Ordering;

    fn image_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG").unwrap();
        file
    }

    #[test]
    fn test_select_then_clear_disables_submit() {
        // Given
        let mut form = UploadForm::new();
        assert!(!form.can_submit());

        // When
        form.select("laudo.png");
        assert!(form.can_submit());
        form.clear();

        // Then
        assert!(form.file().is_none());
        assert!(!form.can_submit());
    }

    #[test]
    fn test_select_clears_previous_error() {
        let mut form = UploadForm::new();
        form.error = Some("boom".to_string());

        form.select("laudo.png");

        assert!(form.error().is_none());
    }

    #[tokio::test]
    async fn test_submit_without_file_does_nothing() {
        let backend = FakeBackend::default();
        let mut form = UploadForm::new();

        let res = form.submit(&backend).await;

        assert!(res.is_none());
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_upload_shows_detail_and_clears_file() {
        // Given
        let backend = FakeBackend::default();
        *backend.fail_upload.lock().unwrap() = true;
        *backend.upload_detail.lock().unwrap() = Some("Bucket not found".to_string());
        let file = image_file();
        let mut form = UploadForm::new();
        form.select(file.path());

        // When
        let res = form.submit(&backend).await;

        // Then
        assert!(res.is_none());
        assert!(form.file().is_none());
        assert!(!form.is_busy());
        assert_eq!(form.error(), Some("Bucket not found"));
    }

    #[tokio::test]
    async fn test_failed_upload_without_detail_uses_generic_message() {
        let backend = FakeBackend::default();
        *backend.fail_upload.lock().unwrap() = true;
        let file = image_file();
        let mut form = UploadForm::new();
        form.select(file.path());

        form.submit(&backend).await;

        assert_eq!(form.error(), Some(GENERIC_UPLOAD_ERROR));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_a_failed_upload() {
        let backend = FakeBackend::default();
        let mut form = UploadForm::new();
        form.select("/nonexistent/laudo.png");

        form.submit(&backend).await;

        assert_eq!(form.error(), Some(GENERIC_UPLOAD_ERROR));
        assert!(form.file().is_none());
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);
    }
}
