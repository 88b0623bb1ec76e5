//! Storage abstraction trait
//!
//! This module defines the `ObjectStore` trait that all storage backends
//! must implement, plus the backend-level error taxonomy.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection, authentication, or directory-creation failure. The
    /// backend could not be reached or prepared; the orchestrator treats
    /// this as grounds for falling back.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Whether the orchestrator may retry this failure against the
    /// fallback backend. Bad paths are the caller's fault and missing
    /// files will be missing everywhere the record says they are.
    pub fn is_fallback_eligible(&self) -> bool {
        !matches!(
            self,
            StorageError::InvalidPath(_) | StorageError::NotFound(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (FTP, local filesystem) implement this trait so
/// the orchestrator can target either without coupling to implementation
/// details. Operations key on the shared `{year}/{month}/{file_name}`
/// relative path; see the crate root documentation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Transfer a staged local file to `relative_path` on the backend,
    /// creating shard directories as needed. Returns the public URL of
    /// the stored object.
    ///
    /// Both backends transfer from a file on disk: the FTP client needs a
    /// local source, and the orchestrator stages every payload anyway.
    async fn upload(&self, source: &Path, relative_path: &str) -> StorageResult<String>;

    /// Fetch the full contents of the object at `relative_path`.
    async fn download(&self, relative_path: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object at `relative_path`.
    async fn delete(&self, relative_path: &str) -> StorageResult<()>;

    /// Check whether an object exists at `relative_path`.
    async fn exists(&self, relative_path: &str) -> StorageResult<bool>;

    /// Public URL for an object, derived from the backend's base URL.
    fn public_url(&self, relative_path: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
