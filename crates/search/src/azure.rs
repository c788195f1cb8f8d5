use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{SearchHit, SearchIndex};

const API_VERSION: &str = "2023-11-01";

/// Azure AI Search index queried over REST.
#[derive(Clone)]
pub struct AzureSearchClient {
    endpoint: String,
    key: String,
    index_name: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchDocument>,
}

#[derive(Deserialize)]
struct SearchDocument {
    #[serde(rename = "@search.score")]
    score: f64,
    #[serde(default)]
    content: Option<String>,
}

impl AzureSearchClient {
    pub fn new(endpoint: String, key: String, index_name: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Azure Search HTTP client")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            index_name,
            client,
        })
    }
}

#[async_trait]
impl SearchIndex for AzureSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index_name, API_VERSION
        );

        let response = self.client
            .post(&url)
            .header("api-key", &self.key)
            .json(&SearchRequest { search: query })
            .send()
            .await
            .context("Failed to send search request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Search request failed: {} {}", status, body);
        }

        let results: SearchResponse = response
            .json()
            .await
            .context("Failed to parse search response")?;

        tracing::debug!(index = %self.index_name, hits = results.value.len(), "Search returned");

        // Service order is relevance order; keep it.
        Ok(results
            .value
            .into_iter()
            .map(|doc| SearchHit {
                score: doc.score,
                content: doc.content.unwrap_or_default(),
            })
            .collect())
    }
}
