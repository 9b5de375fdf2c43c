use std::path::Path;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::Report;

// Struct to map API JSON successful responses
#[derive(Debug)]
pub struct ApiData<T> {
    pub code: Option<StatusCode>,
    pub data: Option<T>,
}

impl<T> ApiData<T> {
    pub fn new() -> ApiData<T> {
        ApiData {
            data: None,
            code: None,
        }
    }
}

/// Body returned by the extraction endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "mensagem", default)]
    pub message: Option<String>,
    #[serde(rename = "url", default)]
    pub image_url: Option<String>,
    #[serde(rename = "analise_ia", default)]
    pub extraction: Value,
    #[serde(default)]
    pub db_data: Vec<Report>,
}

impl UploadResponse {
    /// First persisted record, if the backend stored one
    pub fn first_record(&self) -> Option<&Report> {
        self.db_data.first()
    }
}

/// An image file read into memory, ready to be sent as a multipart part
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub async fn from_path(path: &Path) -> Result<ImageUpload, std::io::Error> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(ImageUpload {
            mime: mime_for(path),
            file_name,
            bytes,
        })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_for(Path::new("laudo.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("scan.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_image_upload_from_path() {
        // Given
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"\xff\xd8\xff").unwrap();

        // When
        let upload = ImageUpload::from_path(file.path()).await.unwrap();

        // Then
        assert_eq!(upload.mime, "image/jpeg");
        assert_eq!(upload.bytes, b"\xff\xd8\xff");
        assert!(upload.file_name.ends_with(".jpg"));
    }

    #[test]
    fn test_upload_response_without_record() {
        let body = r#"{
            "mensagem": "Laudo processado com Groq!",
            "url": "https://cdn.example/testes/a.png",
            "analise_ia": {"status": "ia_nao_configurada"},
            "db_data": []
        }"#;

        let res: UploadResponse = serde_json::from_str(body).unwrap();

        assert!(res.first_record().is_none());
        assert_eq!(res.extraction["status"], "ia_nao_configurada");
    }
}
