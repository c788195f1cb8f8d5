use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Gateway error. Every upstream or storage failure collapses into
/// `Upstream` and is reported as a 500 carrying the underlying message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0:#}")]
    Upstream(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = self.to_string();
        if status.is_server_error() {
            tracing::error!(error = %detail, "Request failed");
        } else {
            tracing::warn!(error = %detail, "Rejected request");
        }

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
