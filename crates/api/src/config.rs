use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the gateway needs, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub document_intelligence: DocumentIntelligenceConfig,
    pub openai: OpenAiConfig,
    pub search: SearchConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIntelligenceConfig {
    pub endpoint: String,
    pub key: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub key: String,
    pub deployment: String,
    pub api_version: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub key: String,
    pub index_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Per HTTP call to an external service.
    pub request_timeout_secs: u64,
    /// Whole gateway operation, including OCR polling.
    pub upstream_timeout_secs: u64,
}

impl TimeoutConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "uploaded_documents".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            upstream_timeout_secs: 120,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_defaults = ServerConfig::default();
        let storage_defaults = StorageConfig::default();
        let timeout_defaults = TimeoutConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: optional("SERVER_HOST", &server_defaults.host),
                port: parse_or(&lookup, "SERVER_PORT", server_defaults.port)?,
            },
            storage: StorageConfig {
                upload_dir: optional("UPLOAD_DIR", &storage_defaults.upload_dir),
                max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", storage_defaults.max_upload_bytes)?,
            },
            document_intelligence: DocumentIntelligenceConfig {
                endpoint: required("AZURE_FORM_RECOGNIZER_ENDPOINT")?,
                key: required("AZURE_FORM_RECOGNIZER_KEY")?,
                model: optional("AZURE_FORM_RECOGNIZER_MODEL", "prebuilt-read"),
            },
            openai: OpenAiConfig {
                endpoint: required("AZURE_OPENAI_ENDPOINT")?,
                key: required("AZURE_OPENAI_KEY")?,
                deployment: optional("AZURE_OPENAI_DEPLOYMENT", "gpt-35-turbo"),
                api_version: optional("AZURE_OPENAI_API_VERSION", rewrite::llm::DEFAULT_API_VERSION),
                temperature: parse_opt(&lookup, "AZURE_OPENAI_TEMPERATURE")?,
                max_tokens: parse_opt(&lookup, "AZURE_OPENAI_MAX_TOKENS")?,
            },
            search: SearchConfig {
                endpoint: required("AZURE_SEARCH_ENDPOINT")?,
                key: required("AZURE_SEARCH_KEY")?,
                index_name: required("AZURE_SEARCH_INDEX_NAME")?,
            },
            timeouts: TimeoutConfig {
                request_timeout_secs: parse_secs(&lookup, "REQUEST_TIMEOUT_SECS", timeout_defaults.request_timeout_secs)?,
                upstream_timeout_secs: parse_secs(&lookup, "UPSTREAM_TIMEOUT_SECS", timeout_defaults.upstream_timeout_secs)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_opt<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        _ => Ok(None),
    }
}

/// A timeout of zero would fail every call, so it is rejected.
fn parse_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::Invalid { key, value: "0".to_string() }),
        secs => Ok(secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("AZURE_FORM_RECOGNIZER_ENDPOINT", "https://ocr.example.com"),
            ("AZURE_FORM_RECOGNIZER_KEY", "ocr-key"),
            ("AZURE_OPENAI_ENDPOINT", "https://llm.example.com"),
            ("AZURE_OPENAI_KEY", "llm-key"),
            ("AZURE_SEARCH_ENDPOINT", "https://search.example.com"),
            ("AZURE_SEARCH_KEY", "search-key"),
            ("AZURE_SEARCH_INDEX_NAME", "manuals"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn required_values_with_defaults() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.document_intelligence.endpoint, "https://ocr.example.com");
        assert_eq!(config.document_intelligence.model, "prebuilt-read");
        assert_eq!(config.openai.deployment, "gpt-35-turbo");
        assert_eq!(config.search.index_name, "manuals");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.upload_dir, "uploaded_documents");
        assert_eq!(config.timeouts.upstream_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn overrides_are_applied() {
        let mut env = base_env();
        env.insert("SERVER_PORT", "9100");
        env.insert("UPLOAD_DIR", "/var/lib/manuals");
        env.insert("AZURE_OPENAI_DEPLOYMENT", "gpt-4o");
        env.insert("REQUEST_TIMEOUT_SECS", " 15 ");

        let config = load(&env).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.upload_dir, "/var/lib/manuals");
        assert_eq!(config.openai.deployment, "gpt-4o");
        assert_eq!(config.timeouts.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn missing_variable_is_named() {
        let mut env = base_env();
        env.remove("AZURE_SEARCH_KEY");
        assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("AZURE_SEARCH_KEY"));

        let mut env = base_env();
        env.insert("AZURE_OPENAI_KEY", "  ");
        assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("AZURE_OPENAI_KEY"));
    }

    #[test]
    fn model_tuning_is_optional() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.openai.temperature, None);
        assert_eq!(config.openai.max_tokens, None);

        let mut env = base_env();
        env.insert("AZURE_OPENAI_TEMPERATURE", "0.2");
        env.insert("AZURE_OPENAI_MAX_TOKENS", "800");
        let config = load(&env).unwrap();
        assert_eq!(config.openai.temperature, Some(0.2));
        assert_eq!(config.openai.max_tokens, Some(800));

        env.insert("AZURE_OPENAI_MAX_TOKENS", "lots");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { key: "AZURE_OPENAI_MAX_TOKENS", value: "lots".to_string() }
        );
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let mut env = base_env();
        env.insert("REQUEST_TIMEOUT_SECS", "0");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { key: "REQUEST_TIMEOUT_SECS", value: "0".to_string() }
        );

        let mut env = base_env();
        env.insert("UPSTREAM_TIMEOUT_SECS", " 0 ");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { key: "UPSTREAM_TIMEOUT_SECS", value: "0".to_string() }
        );
    }

    #[test]
    fn malformed_number_is_rejected() {
        let mut env = base_env();
        env.insert("SERVER_PORT", "eighty");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { key: "SERVER_PORT", value: "eighty".to_string() }
        );
    }
}
