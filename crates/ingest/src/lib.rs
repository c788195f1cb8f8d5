pub mod ocr;
pub mod schema;
pub mod store;

pub use ocr::{DocumentAnalyzer, FormRecognizerClient};
pub use schema::{AnalyzeResult, Line, Page};
pub use store::{UploadStore, sanitize_filename};

use anyhow::Result;
use std::path::PathBuf;

/// A stored upload and the text read from it.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub stored_path: PathBuf,
    pub text: String,
}

/// Main ingestion pipeline: persist the upload, then run it through OCR.
pub async fn ingest_document(
    store: &UploadStore,
    analyzer: &dyn DocumentAnalyzer,
    filename: &str,
    bytes: &[u8],
) -> Result<IngestedDocument> {
    let stored_path = store.save(filename, bytes).await?;

    let analysis = analyzer.analyze(bytes).await?;
    let text = analysis.text();

    tracing::info!(
        path = %stored_path.display(),
        pages = analysis.pages.len(),
        chars = text.len(),
        "Document ingested"
    );

    Ok(IngestedDocument { stored_path, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedAnalyzer(AnalyzeResult);

    #[async_trait]
    impl DocumentAnalyzer for CannedAnalyzer {
        async fn analyze(&self, _document: &[u8]) -> Result<AnalyzeResult> {
            Ok(self.0.clone())
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl DocumentAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _document: &[u8]) -> Result<AnalyzeResult> {
            anyhow::bail!("InvalidRequest: unsupported format")
        }
    }

    #[tokio::test]
    async fn ingest_stores_and_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let analyzer = CannedAnalyzer(AnalyzeResult::from_pages([[" Hello", "World"]]));

        let doc = ingest_document(&store, &analyzer, "manual.pdf", b"bytes")
            .await
            .unwrap();

        assert_eq!(doc.text, "Hello World");
        assert_eq!(doc.stored_path, dir.path().join("manual.pdf"));
        assert_eq!(std::fs::read(&doc.stored_path).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn ingest_surfaces_analyzer_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let err = ingest_document(&store, &FailingAnalyzer, "manual.pdf", b"bytes")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "InvalidRequest: unsupported format");
    }
}
