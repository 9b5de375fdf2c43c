use reqwest::multipart::{Form, Part};
use spdlog::prelude::*;
use uuid::Uuid;

use crate::api::{ApiClient, ClientError, ImageUpload, UploadResponse};
use crate::report::{Payload, Report, ReportId};

/// Remote side of the client: lists, creates and updates reports
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn list_reports(&self, user_id: &Uuid) -> Result<Vec<Report>, ClientError>;

    async fn upload_image(&self, image: ImageUpload) -> Result<UploadResponse, ClientError>;

    async fn update_report(&self, id: &ReportId, payload: &Payload) -> Result<(), ClientError>;
}

impl Backend for ApiClient {
    // performs GET /historico/<user_id>, newest first
    async fn list_reports(&self, user_id: &Uuid) -> Result<Vec<Report>, ClientError> {
        let uri = format!("/historico/{}", user_id);
        let reports: Option<Vec<Report>> = self.get(&uri).await?;

        Ok(reports.unwrap_or_default())
    }

    // performs POST /processar-laudo with a single multipart `file` field
    async fn upload_image(&self, image: ImageUpload) -> Result<UploadResponse, ClientError> {
        info!("Uploading {} ({} bytes)...", image.file_name, image.bytes.len());
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)?;
        let form = Form::new().part("file", part);

        let res = self.post_multipart("/processar-laudo", form).await?;
        info!("Done");

        Ok(res)
    }

    // performs PUT /atualizar-laudo/<id> with the whole payload
    async fn update_report(&self, id: &ReportId, payload: &Payload) -> Result<(), ClientError> {
        info!("Saving report {}...", id);
        let uri = format!("/atualizar-laudo/{}", id);
        let _: serde_json::Value = self.put(&uri, payload).await?;
        info!("Done");

        Ok(())
    }
}
