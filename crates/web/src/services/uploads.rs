//! Local storage for uploaded images.
//!
//! Files land in a single flat directory that is also served at `/uploads`.
//! Names are random UUIDs, so concurrent writers never collide and nothing
//! needs locking. Files are never cleaned up.

use std::path::{Path, PathBuf};

use righthair_core::{DataUrl, ImageRefError};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The data URL payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] ImageRefError),

    /// Writing the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Directory-backed upload store.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode a data URL and write it to a fresh file.
    ///
    /// Returns the file name, `<uuid>.<ext>`, relative to [`Self::dir`].
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Decode` for an invalid payload and
    /// `UploadError::Io` if the directory or file cannot be written.
    pub async fn save(&self, data: &DataUrl) -> Result<String, UploadError> {
        let bytes = data.decode()?;
        let file_name = format!("{}.{}", Uuid::new_v4(), data.extension());

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), &bytes).await?;

        tracing::info!(file = %file_name, bytes = bytes.len(), "Stored upload");
        Ok(file_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_decoded_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"));

        let data = DataUrl::parse("data:image/jpeg;base64,aGVsbG8=").unwrap();
        let name = store.save(&data).await.unwrap();

        assert!(name.ends_with(".jpg"));
        let written = std::fs::read(store.dir().join(&name)).unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn test_save_names_are_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path());
        let data = DataUrl::parse("data:image/png;base64,aGVsbG8=").unwrap();

        let first = store.save(&data).await.unwrap();
        let second = store.save(&data).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_payload_without_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"));
        let data = DataUrl::parse("data:image/png;base64,@@@").unwrap();

        let err = store.save(&data).await.unwrap_err();

        assert!(matches!(err, UploadError::Decode(ImageRefError::InvalidBase64)));
        assert!(!store.dir().exists());
    }
}
