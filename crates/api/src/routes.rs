use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use search::SearchHit;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    extracted_text: String,
}

#[derive(Deserialize)]
struct UpdateRequest {
    document_text: String,
}

#[derive(Serialize)]
struct UpdateResponse {
    message: String,
    updated_text: String,
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/upload-document/", post(upload_document))
        .route("/update-document/", post(update_document))
        .route("/search/", get(search_documents))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run one upstream operation, giving up (and dropping it) after `limit`.
async fn with_deadline<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => Err(ApiError::Upstream(anyhow::anyhow!(
            "{} timed out after {}s",
            operation,
            limit.as_secs_f64()
        ))),
    }
}

async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?;

        tracing::info!(filename = %filename, bytes = bytes.len(), "Received upload");

        let doc = with_deadline(
            state.upstream_timeout,
            "Document analysis",
            ingest::ingest_document(&state.store, state.analyzer.as_ref(), &filename, &bytes),
        )
        .await?;

        return Ok(Json(UploadResponse {
            message: "Document uploaded and processed successfully".to_string(),
            extracted_text: doc.text,
        }));
    }

    Err(ApiError::BadRequest("No file provided. Use field name 'file'".to_string()))
}

async fn update_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    tracing::info!(chars = req.document_text.len(), "Rewriting document");

    let updated_text = with_deadline(
        state.upstream_timeout,
        "Document update",
        state.rewriter.rewrite(&req.document_text),
    )
    .await?;

    Ok(Json(UpdateResponse {
        message: "Document updated successfully".to_string(),
        updated_text,
    }))
}

async fn search_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = with_deadline(
        state.upstream_timeout,
        "Search",
        state.search.search(&params.query),
    )
    .await?;

    tracing::info!(query = %params.query, hits = results.len(), "Search completed");

    Ok(Json(SearchResponse { results }))
}
