//! Download trigger: hand the converted document to the user.
//!
//! The pipeline does not know where documents end up; it calls a
//! [`DownloadTrigger`] with the payload and the suggested filename. The
//! shipped [`FileDownloadTrigger`] saves into a directory.
//!
//! ## Why a temp file first?
//!
//! The payload is written to a [`tempfile::NamedTempFile`] next to its final
//! location and then persisted (renamed) under the suggested name. A reader
//! never sees a half-written document, and if anything fails before the
//! rename the temp file is deleted when its handle drops.

use crate::error::XlsxToPdfError;
use crate::output::DownloadReceipt;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Delivers a converted document under a suggested filename.
#[async_trait]
pub trait DownloadTrigger: Send + Sync {
    async fn trigger(&self, payload: Bytes, filename: &str) -> Result<DownloadReceipt, XlsxToPdfError>;
}

/// Saves downloads into a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FileDownloadTrigger {
    dir: PathBuf,
}

impl FileDownloadTrigger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `filename` would be saved. Only its final component is used.
    pub fn target_path(&self, filename: &str) -> Option<PathBuf> {
        Path::new(filename).file_name().map(|name| self.dir.join(name))
    }
}

#[async_trait]
impl DownloadTrigger for FileDownloadTrigger {
    async fn trigger(&self, payload: Bytes, filename: &str) -> Result<DownloadReceipt, XlsxToPdfError> {
        let target = self.target_path(filename).ok_or_else(|| {
            XlsxToPdfError::InvalidConfig(format!("output filename '{filename}' does not name a file"))
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| XlsxToPdfError::DownloadFailed {
                path: target.clone(),
                source: e,
            })?;

        let dir = self.dir.clone();
        let path = target.clone();
        let len = payload.len();

        tokio::task::spawn_blocking(move || save_atomically(&dir, &path, &payload))
            .await
            .map_err(|e| XlsxToPdfError::Internal(format!("Download task panicked: {e}")))?
            .map_err(|e| XlsxToPdfError::DownloadFailed {
                path: target.clone(),
                source: e,
            })?;

        info!("Saved {} bytes to {}", len, target.display());
        Ok(DownloadReceipt {
            path: Some(target),
            bytes: len,
        })
    }
}

/// Blocking write-then-persist of the payload.
fn save_atomically(dir: &Path, target: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    debug!("Staging download in {}", tmp.path().display());
    tmp.write_all(payload)?;
    tmp.as_file().sync_all()?;
    // On failure the returned handle is dropped here, deleting the temp file.
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn target_path_strips_directories() {
        let trigger = FileDownloadTrigger::new("/downloads");
        assert_eq!(
            trigger.target_path("../../etc/report.pdf"),
            Some(PathBuf::from("/downloads/report.pdf"))
        );
        assert_eq!(trigger.target_path(".."), None);
    }

    #[tokio::test]
    async fn saves_payload_under_suggested_name() {
        let dir = TempDir::new().unwrap();
        let trigger = FileDownloadTrigger::new(dir.path());

        let receipt = trigger
            .trigger(Bytes::from_static(b"%PDF-1.7 body"), "q3.pdf")
            .await
            .unwrap();

        let expected = dir.path().join("q3.pdf");
        assert_eq!(receipt.path.as_deref(), Some(expected.as_path()));
        assert_eq!(receipt.bytes, 13);
        assert_eq!(std::fs::read(&expected).unwrap(), b"%PDF-1.7 body");

        // Only the final document is left behind.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn creates_missing_directory_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out/pdf");
        let trigger = FileDownloadTrigger::new(&nested);

        trigger.trigger(Bytes::from_static(b"old"), "r.pdf").await.unwrap();
        trigger.trigger(Bytes::from_static(b"new"), "r.pdf").await.unwrap();

        assert_eq!(std::fs::read(nested.join("r.pdf")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn rejects_filename_without_file_component() {
        let dir = TempDir::new().unwrap();
        let trigger = FileDownloadTrigger::new(dir.path());
        let err = trigger.trigger(Bytes::new(), "/").await.unwrap_err();
        assert!(matches!(err, XlsxToPdfError::InvalidConfig(_)));
    }
}
