use std::{future::Future, path::PathBuf};

use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use thiserror::Error;
use tracing::instrument;

use crate::{config::DetectionServiceConfig, models::DetectionResponse, upload::ImageUpload};

/// Name of the multipart field the detection service reads the image from.
pub const FILE_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Failed to read image {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Detection request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Detection service answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Malformed detection response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can turn an uploaded image into a detection result.
pub trait DetectionService: Send + Sync + 'static {
    fn detect(
        &self,
        upload: ImageUpload,
    ) -> impl Future<Output = Result<DetectionResponse, DetectError>> + Send;
}

/// Talks to the detection service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDetectionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDetectionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DetectError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &DetectionServiceConfig) -> Result<Self, DetectError> {
        Self::new(config.get_endpoint())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DetectionService for HttpDetectionClient {
    #[instrument(skip(self, upload), fields(endpoint = %self.endpoint, file = %upload.file_name, len = upload.bytes.len()))]
    async fn detect(&self, upload: ImageUpload) -> Result<DetectionResponse, DetectError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::debug!(error = %err, "failed to read error response body");
                    String::new()
                }
            };
            return Err(DetectError::Status { status, body });
        }

        let body = response.bytes().await?;
        let detection: DetectionResponse = serde_json::from_slice(&body)?;
        tracing::debug!(classes = detection.counts.len(), "detection response received");

        Ok(detection)
    }
}
