//! HTTP gateway in front of the OCR, language-model and search services.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
