use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use search::SearchHit;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The gateway answered with an error; carries its `detail`.
    #[error("{0}")]
    Gateway(String),

    #[error("Could not reach the gateway: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub extracted_text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResponse {
    pub message: String,
    pub updated_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    document_text: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// HTTP client for the gateway's three operations.
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn upload_document(&self, path: &Path) -> Result<UploadResponse, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));

        let response = self.client
            .post(format!("{}/upload-document/", self.base_url))
            .multipart(form)
            .send()
            .await?;

        Self::decode(response).await
    }

    pub async fn update_document(&self, document_text: &str) -> Result<UpdateResponse, ClientError> {
        let response = self.client
            .post(format!("{}/update-document/", self.base_url))
            .json(&UpdateRequest { document_text })
            .send()
            .await?;

        Self::decode(response).await
    }

    pub async fn search(&self, query: &str) -> Result<SearchResponse, ClientError> {
        let response = self.client
            .get(format!("{}/search/", self.base_url))
            .query(&[("query", query)])
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { detail: serde_json::Value::String(s) }) => s,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => body,
        };

        Err(ClientError::Gateway(detail))
    }
}
