use crate::api::{ApiData, ApiError};
use reqwest::{Error, RequestBuilder, Response, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Error as SerdeError;
use spdlog::prelude::*;
use thiserror::Error;
use url::Url;

#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("bad base url")]
    BadUrl(#[from] url::ParseError),

    #[error("api error: {0}")]
    ApiError(#[from] ApiError),

    #[error("reqwest error: {0}")]
    ReqwestError(#[from] Error),

    #[error("json error: {0}")]
    JsonError(#[from] SerdeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response carried no data")]
    MissingData,
}

impl ClientError {
    /// Human-readable message supplied by the backend, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::ApiError(err) => err.message(),
            _ => None,
        }
    }
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Url::parse(base_url)?;

        Ok(ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, uri: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, uri);
        let request = self.client.get(url);

        self.send_for(request).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        uri: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, uri);
        let request = self.client.put(url).json(body);

        self.send_for(request).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        uri: &str,
        form: Form,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, uri);
        let request = self.client.post(url).multipart(form);

        self.send_for(request).await
    }

    async fn send_for<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let res = self.send(request).await?;
        debug!("status {:?}", res.code);
        let data = res.data.ok_or(ClientError::MissingData)?;

        Ok(serde_json::from_value(data)?)
    }

    async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiData<serde_json::Value>, ClientError> {
        let res = request.send().await?;
        self.handle_response(res).await
    }

    async fn handle_response(
        &self,
        response: Response,
    ) -> Result<ApiData<serde_json::Value>, ClientError> {
        let status = response.status();
        let message = response.text().await?;
        debug!("response body: {} bytes", message.len());

        if status.is_client_error() || status.is_server_error() {
            let err = ApiError::from_body(status, &message);
            error!("request failed with {:?} ({})", err.code(), status);
            return Err(ClientError::ApiError(err));
        }

        let mut api_response = ApiData::new();
        api_response.code = Some(status);
        api_response.data = Some(if message.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&message)?
        });

        Ok(api_response)
    }
}
