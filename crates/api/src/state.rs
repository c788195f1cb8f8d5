use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use ingest::{DocumentAnalyzer, FormRecognizerClient, UploadStore};
use rewrite::{AzureOpenAiClient, Rewriter};
use search::{AzureSearchClient, SearchIndex};

use crate::config::AppConfig;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: UploadStore,
    pub analyzer: Arc<dyn DocumentAnalyzer>,
    pub rewriter: Rewriter,
    pub search: Arc<dyn SearchIndex>,
    pub upstream_timeout: Duration,
}

impl AppState {
    /// Wire the real Azure clients from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let request_timeout = config.timeouts.request_timeout();

        let analyzer = FormRecognizerClient::new(
            config.document_intelligence.endpoint.clone(),
            config.document_intelligence.key.clone(),
            request_timeout,
        )?
        .with_model(config.document_intelligence.model.clone());

        let mut llm_client = AzureOpenAiClient::new(
            config.openai.endpoint.clone(),
            config.openai.key.clone(),
            config.openai.deployment.clone(),
            request_timeout,
        )?
        .with_api_version(config.openai.api_version.clone());
        if let Some(temperature) = config.openai.temperature {
            llm_client = llm_client.with_temperature(temperature);
        }
        if let Some(max_tokens) = config.openai.max_tokens {
            llm_client = llm_client.with_max_tokens(max_tokens);
        }

        let search = AzureSearchClient::new(
            config.search.endpoint.clone(),
            config.search.key.clone(),
            config.search.index_name.clone(),
            request_timeout,
        )?;

        Ok(Self {
            store: UploadStore::new(&config.storage.upload_dir),
            analyzer: Arc::new(analyzer),
            rewriter: Rewriter::new(Arc::new(llm_client)),
            search: Arc::new(search),
            upstream_timeout: config.timeouts.upstream_timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    #[test]
    fn builds_from_config_with_model_tuning() {
        let env = HashMap::from([
            ("AZURE_FORM_RECOGNIZER_ENDPOINT", "https://ocr.example.com/"),
            ("AZURE_FORM_RECOGNIZER_KEY", "ocr-key"),
            ("AZURE_OPENAI_ENDPOINT", "https://llm.example.com"),
            ("AZURE_OPENAI_KEY", "llm-key"),
            ("AZURE_OPENAI_TEMPERATURE", "0.3"),
            ("AZURE_OPENAI_MAX_TOKENS", "512"),
            ("AZURE_SEARCH_ENDPOINT", "https://search.example.com"),
            ("AZURE_SEARCH_KEY", "search-key"),
            ("AZURE_SEARCH_INDEX_NAME", "manuals"),
            ("UPLOAD_DIR", "/srv/uploads"),
            ("UPSTREAM_TIMEOUT_SECS", "45"),
        ]);
        let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();

        let state = AppState::from_config(&config).unwrap();

        assert_eq!(state.store.root(), Path::new("/srv/uploads"));
        assert_eq!(state.upstream_timeout, Duration::from_secs(45));
    }
}
