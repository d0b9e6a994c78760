//! HTTP client for the analysis backend.
//!
//! Endpoints, relative to the configured API URL:
//! - `POST /upload` (multipart field `file`)
//! - `POST /analyze` (JSON)
//! - `GET /health`

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};
use url::Url;

use crate::analysis::{AnalysisBackend, AnalysisRequest, AnalyzeResponse};
use crate::config::Settings;
use crate::error::{parse_error_detail, ApiError};
use crate::upload::{SelectedFile, TransferProgress, UploadResponse, UploadTransport};

/// Upload body chunk size; one progress report per chunk.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Client for the upload, analyze and health endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid API URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(&settings.api_url, settings.timeout(), &settings.user_agent)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Probe `GET /health`; returns the reported status.
    pub async fn health(&self) -> Result<String, ApiError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let body = read_json(response).await?;
        let health: HealthResponse =
            serde_json::from_value(body).map_err(|e| ApiError::Protocol(e.to_string()))?;
        Ok(health.status)
    }

    /// `POST /analyze`, unwrapping the response envelope if there is one.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ApiError> {
        debug!(
            "POST {} type={} collection={:?}",
            self.endpoint("analyze"),
            request.kind,
            request.collection_name
        );
        let response = self
            .client
            .post(self.endpoint("analyze"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let body = read_json(response).await?;
        AnalyzeResponse::from_value(body).into_result()
    }

    /// `POST /upload`, reporting bytes as the body is streamed.
    pub async fn upload_file(
        &self,
        file: SelectedFile,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<UploadResponse, ApiError> {
        let total = file.size_bytes();
        let mut loaded = 0u64;
        let chunks = futures::stream::iter(file.chunks(UPLOAD_CHUNK_SIZE)).map(move |chunk| {
            loaded += chunk.len() as u64;
            let _ = progress.send(TransferProgress {
                loaded,
                total: Some(total),
            });
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(chunks), total)
            .file_name(file.name().to_string())
            .mime_str(&file.mime_type())
            .map_err(|e| ApiError::Protocol(format!("invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        info!("POST {} ({} bytes)", self.endpoint("upload"), total);
        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let body = read_json(response).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Protocol(e.to_string()))
    }
}

/// Read a response body, classifying non-success statuses.
async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_transport(&e))?;

    if !status.is_success() {
        debug!("HTTP {} body: {}", status, body);
        return Err(ApiError::from_status(status, parse_error_detail(&body)));
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Protocol(format!("invalid JSON: {}", e)))
}

#[async_trait]
impl UploadTransport for ApiClient {
    async fn upload(
        &self,
        file: SelectedFile,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<UploadResponse, ApiError> {
        self.upload_file(file, progress).await
    }
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value, ApiError> {
        ApiClient::analyze(self, request).await
    }
}
