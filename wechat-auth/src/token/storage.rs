//! Credential storage: the trait and its file-backed implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::*;
use rand::Rng;

use super::expiry::has_required_fields;
use super::{Credential, CredentialKind};
use crate::error::{
    config_error, io_error, storage_error, ConfigErrorKind, Error, ErrorKind, StorageErrorKind,
};

/// Trait for persisting one credential record per kind.
///
/// `read` performs no expiry check; validity is the caller's concern.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the stored record.
    ///
    /// # Errors
    ///
    /// `StorageErrorKind::NotFound` when nothing is stored, `EmptyFile`,
    /// `Parse` or `MissingField` when the stored content is unusable.
    async fn read<C: Credential>(&self) -> Result<C, Error>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// `StorageErrorKind::Io` on any write failure.
    async fn write<C: Credential>(&self, record: &C) -> Result<(), Error>;
}

/// Stores each credential kind as a flat JSON file in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store rooted at the process working directory.
    pub fn current_dir() -> Result<Self, Error> {
        let dir = std::env::current_dir().map_err(|e| {
            config_error(
                ConfigErrorKind::WorkingDirectory,
                &format!("cannot resolve working directory: {e}"),
            )
        })?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `kind`.
    pub fn path_for(&self, kind: CredentialKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    fn temp_path_for(&self, kind: CredentialKind) -> PathBuf {
        let suffix: u32 = rand::thread_rng().gen();
        self.dir
            .join(format!(".{}.{:08x}.tmp", kind.file_name(), suffix))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn read<C: Credential>(&self) -> Result<C, Error> {
        let path = self.path_for(C::KIND);
        let content = tokio::fs::read(&path).await.map_err(io_error)?;
        decode(&content)
    }

    async fn write<C: Credential>(&self, record: &C) -> Result<(), Error> {
        let path = self.path_for(C::KIND);
        let json = serde_json::to_vec(record).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::Io),
        })?;

        // Rename over the target so readers never see a partially written file.
        let temp_path = self.temp_path_for(C::KIND);
        if let Err(e) = tokio::fs::write(&temp_path, &json).await {
            warn!("Failed to write {}: {e}", temp_path.display());
            return Err(write_failure(e));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            warn!("Failed to replace {}: {e}", path.display());
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(write_failure(e));
        }

        debug!("Persisted {} to {}", C::KIND, path.display());
        Ok(())
    }
}

/// Decode stored bytes into a record, classifying why unusable content failed.
pub(crate) fn decode<C: Credential>(content: &[u8]) -> Result<C, Error> {
    if is_blank(content) {
        return Err(storage_error(
            StorageErrorKind::EmptyFile,
            &format!("{} is empty", C::KIND.file_name()),
        ));
    }

    let value: serde_json::Value = serde_json::from_slice(content).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Storage(StorageErrorKind::Parse),
    })?;

    let record: C = serde_json::from_value(value).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Storage(StorageErrorKind::MissingField),
    })?;

    if !has_required_fields(&record) {
        return Err(storage_error(
            StorageErrorKind::MissingField,
            &format!("{} has an empty value or expiry", C::KIND.file_name()),
        ));
    }

    Ok(record)
}

/// Whitespace-only content, counting a byte order mark as whitespace.
fn is_blank(content: &[u8]) -> bool {
    std::str::from_utf8(content)
        .map(|s| s.chars().all(|c| c.is_whitespace() || c == '\u{feff}'))
        .unwrap_or(false)
}

fn write_failure(err: std::io::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Storage(StorageErrorKind::Io),
    }
}
