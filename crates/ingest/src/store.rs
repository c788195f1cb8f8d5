use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

const FALLBACK_NAME: &str = "document";

/// Directory that receives uploaded documents.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a document uploaded as `filename` ends up.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(sanitize_filename(filename))
    }

    /// Write `bytes` under the sanitized `filename`, replacing any previous
    /// upload with the same name.
    ///
    /// The data is written to a temporary sibling first and renamed into
    /// place, so the target is either the old file or the complete new one.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create upload directory {:?}", self.root))?;

        let target = self.path_for(filename);
        let staging = self.root.join(format!(".upload-{}.part", uuid::Uuid::new_v4()));

        if let Err(e) = fs::write(&staging, bytes).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e).with_context(|| format!("Failed to write upload {:?}", target));
        }

        if let Err(e) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e).with_context(|| format!("Failed to move upload into {:?}", target));
        }

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Stored upload");
        Ok(target)
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Only the last component is kept, anything outside `[A-Za-z0-9._-]` becomes
/// `_`, and leading dots are removed so the result can't be `..` or hidden.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\manual.pdf"), "manual.pdf");
        assert_eq!(sanitize_filename("/abs/path/diagram.png"), "diagram.png");
    }

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_filename("line 3 manual (v2).pdf"), "line_3_manual__v2_.pdf");
        assert_eq!(sanitize_filename("über.pdf"), "_ber.pdf");
    }

    #[test]
    fn sanitize_never_yields_dot_names_or_empty() {
        assert_eq!(sanitize_filename(".."), FALLBACK_NAME);
        assert_eq!(sanitize_filename(""), FALLBACK_NAME);
        assert_eq!(sanitize_filename("dir/"), FALLBACK_NAME);
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[tokio::test]
    async fn save_creates_directory_and_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));

        let path = store.save("manual.pdf", b"%PDF-1.7").await.unwrap();

        assert_eq!(path, dir.path().join("uploads").join("manual.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn repeated_saves_keep_last_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        store.save("manual.pdf", &vec![b'a'; 4096]).await.unwrap();
        store.save("manual.pdf", b"short").await.unwrap();
        let path = store.save("manual.pdf", b"final contents").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"final contents");

        // No staging files are left behind.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["manual.pdf".to_string()]);
    }

    #[tokio::test]
    async fn failed_rename_reports_error_and_cleans_staging() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        // A non-empty directory squats on the target name, so the rename fails.
        std::fs::create_dir(dir.path().join("manual.pdf")).unwrap();
        std::fs::write(dir.path().join("manual.pdf").join("keep.txt"), b"x").unwrap();

        let err = store.save("manual.pdf", b"new bytes").await.unwrap_err();

        assert!(err.to_string().starts_with("Failed to move upload into"), "{err}");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["manual.pdf".to_string()]);
        assert!(dir.path().join("manual.pdf").join("keep.txt").exists());
    }

    #[tokio::test]
    async fn traversal_attempt_stays_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = UploadStore::new(&root);

        let path = store.save("../escape.txt", b"x").await.unwrap();

        assert_eq!(path, root.join("escape.txt"));
        assert!(!dir.path().join("escape.txt").exists());
    }
}
