//! One function per gateway operation: check the input is present, make
//! the call, and render the reply as text.

use colored::Colorize;
use std::path::Path;

use crate::client::{ClientError, GatewayClient};

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("{0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub async fn upload(client: &GatewayClient, path: &Path) -> Result<String, FormError> {
    if !path.is_file() {
        return Err(FormError::MissingInput("Please choose a document to upload."));
    }

    let response = client.upload_document(path).await?;
    Ok(render_text("Extracted text", &response.extracted_text))
}

pub async fn update(client: &GatewayClient, document_text: &str) -> Result<String, FormError> {
    if document_text.trim().is_empty() {
        return Err(FormError::MissingInput("Please enter the document text to update."));
    }

    let response = client.update_document(document_text).await?;
    Ok(render_text("Updated text", &response.updated_text))
}

pub async fn search(client: &GatewayClient, query: &str) -> Result<String, FormError> {
    if query.trim().is_empty() {
        return Err(FormError::MissingInput("Please enter a search query."));
    }

    let response = client.search(query).await?;
    if response.results.is_empty() {
        return Ok("No results found.".to_string());
    }

    let lines: Vec<String> = response
        .results
        .iter()
        .map(|hit| format!("{}  {}", format!("{:.4}", hit.score).cyan(), hit.content))
        .collect();

    Ok(lines.join("\n"))
}

fn render_text(title: &str, body: &str) -> String {
    format!("{}\n{}", title.bold(), body)
}

/// The single error banner shown for a failed action.
pub fn error_banner(err: &dyn std::fmt::Display) -> String {
    format!("{} {}", "Error:".red().bold(), err)
}
