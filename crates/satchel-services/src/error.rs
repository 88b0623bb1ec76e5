//! Service-level error taxonomy.
//!
//! Backend errors are caught and translated at the orchestrator boundary;
//! raw protocol errors never reach callers. A caller sees either a
//! complete `StoredObject` or exactly one of these.

use satchel_core::AppError;
use satchel_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Both the remote attempt and the local fallback failed; nothing
    /// was persisted.
    #[error("No storage backend available (remote: {remote}; local: {local})")]
    Unavailable {
        remote: StorageError,
        local: StorageError,
    },

    /// Bytes are durably stored but the metadata record could not be
    /// written or read. Surfaced distinctly so operators can reconcile
    /// orphaned bytes out of band.
    #[error("Metadata store error: {0}")]
    Metadata(#[source] AppError),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// A backend failure outside the fallback protocol (retrieval,
    /// deletion, or a non-retryable upload error).
    #[error("Storage backend error: {0}")]
    Backend(#[source] StorageError),

    /// The payload could not be staged to a local temporary file; no
    /// backend was attempted.
    #[error("Failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),
}
