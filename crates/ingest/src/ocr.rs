use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::schema::AnalyzeResult;

const DEFAULT_MODEL: &str = "prebuilt-read";
const API_VERSION: &str = "2023-07-31";

/// Turns a document into pages of text lines.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, document: &[u8]) -> Result<AnalyzeResult>;
}

/// Azure AI Document Intelligence (Form Recognizer) over REST.
#[derive(Clone)]
pub struct FormRecognizerClient {
    endpoint: String,
    key: String,
    model: String,
    poll_interval: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationStatus {
    status: String,
    analyze_result: Option<AnalyzeResult>,
    error: Option<ServiceError>,
}

#[derive(Deserialize)]
struct ServiceError {
    code: Option<String>,
    message: String,
}

impl FormRecognizerClient {
    pub fn new(endpoint: String, key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Document Intelligence HTTP client")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            model: DEFAULT_MODEL.to_string(),
            poll_interval: Duration::from_secs(1),
            client,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit the document; returns the operation URL to poll.
    async fn submit(&self, document: &[u8]) -> Result<String> {
        let url = format!(
            "{}/formrecognizer/documentModels/{}:analyze?api-version={}",
            self.endpoint, self.model, API_VERSION
        );

        let response = self.client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(document.to_vec())
            .send()
            .await
            .context("Failed to send document to Document Intelligence")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Document Intelligence analyze request failed: {} {}", status, body);
        }

        let operation = response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .context("Document Intelligence response had no Operation-Location header")?;

        Ok(operation)
    }

    async fn poll(&self, operation: &str) -> Result<AnalyzeResult> {
        loop {
            let response = self.client
                .get(operation)
                .header("Ocp-Apim-Subscription-Key", &self.key)
                .send()
                .await
                .context("Failed to poll Document Intelligence operation")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Document Intelligence poll failed: {} {}", status, body);
            }

            let op: OperationStatus = response
                .json()
                .await
                .context("Failed to parse Document Intelligence operation status")?;

            match op.status.as_str() {
                "succeeded" => return Ok(op.analyze_result.unwrap_or_default()),
                "failed" | "canceled" => {
                    let detail = op
                        .error
                        .map(|e| match e.code {
                            Some(code) => format!("{}: {}", code, e.message),
                            None => e.message,
                        })
                        .unwrap_or_else(|| format!("operation {}", op.status));
                    anyhow::bail!("Document analysis failed: {}", detail);
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for FormRecognizerClient {
    async fn analyze(&self, document: &[u8]) -> Result<AnalyzeResult> {
        let operation = self.submit(document).await?;
        tracing::debug!(model = %self.model, "Document submitted, polling for result");
        self.poll(&operation).await
    }
}
