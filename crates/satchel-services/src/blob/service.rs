//! Blob storage orchestrator
//!
//! Store workflow: name → stage → remote upload (→ local fallback) →
//! persist metadata. The staged temp file is removed on every exit path,
//! the payload is never written to metadata before some backend holds it,
//! and the backend that won the fallback is recorded so retrieval and
//! deletion dispatch directly instead of guessing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use satchel_core::{StorageBackend, StoredObject};
use satchel_db::MetadataStore;
use satchel_storage::{naming::ObjectName, ObjectStore, StorageError};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::StoreError;

/// A caller's upload: raw bytes plus asserted descriptive fields.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub data: Vec<u8>,
    pub original_name: String,
    /// Caller-asserted MIME type, not re-verified against the bytes.
    pub content_type: String,
    /// Owning message, when the upload is an attachment.
    pub message_id: Option<Uuid>,
}

/// Storage orchestrator
///
/// Holds one remote and one local backend plus the metadata store, all
/// behind their trait seams so tests can inject fakes. Calls are
/// independent; objects are immutable and addressed by never-reused ids,
/// so no cross-call coordination is needed.
pub struct BlobStorageService {
    remote: Arc<dyn ObjectStore>,
    local: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    staging_dir: PathBuf,
}

impl BlobStorageService {
    pub fn new(
        remote: Arc<dyn ObjectStore>,
        local: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            remote,
            local,
            metadata,
            staging_dir: std::env::temp_dir(),
        }
    }

    /// Override the staging directory for temp files.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Store an uploaded payload and return its completed record.
    pub async fn store(&self, upload: NewUpload) -> Result<StoredObject, StoreError> {
        let name = ObjectName::assign(&upload.original_name, Utc::now());
        let size_bytes = upload.data.len() as i64;

        // Staged on disk for the duration of the call; both backends
        // transfer from a local source file. The guard removes the file
        // on every exit path, including errors.
        let staging = NamedTempFile::new_in(&self.staging_dir).map_err(StoreError::Staging)?;
        tokio::fs::write(staging.path(), &upload.data)
            .await
            .map_err(StoreError::Staging)?;

        let (backend, public_url) = self
            .write_bytes(staging.path(), &name.relative_path)
            .await?;
        drop(staging);

        let object = StoredObject {
            id: Uuid::new_v4(),
            original_name: upload.original_name,
            content_type: upload.content_type,
            size_bytes,
            relative_path: name.relative_path,
            public_url,
            backend,
            message_id: upload.message_id,
            created_at: Utc::now(),
        };

        if let Err(e) = self.metadata.create(&object).await {
            tracing::error!(
                key = %object.relative_path,
                backend = %object.backend,
                error = %e,
                "Bytes stored but metadata record not written"
            );
            return Err(StoreError::Metadata(e));
        }

        tracing::info!(
            id = %object.id,
            key = %object.relative_path,
            backend = %object.backend,
            size_bytes = object.size_bytes,
            "Object stored"
        );

        Ok(object)
    }

    /// Fetch the bytes of a stored object.
    pub async fn retrieve(&self, id: Uuid) -> Result<Vec<u8>, StoreError> {
        let object = self.load(id).await?;

        match self
            .backend_for(object.backend)
            .download(&object.relative_path)
            .await
        {
            Ok(data) => Ok(data),
            Err(StorageError::NotFound(_)) => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(StoreError::Backend(e)),
        }
    }

    /// Delete a stored object: bytes first, then the record. If byte
    /// deletion fails the record is retained — an orphaned record
    /// pointing at undeletable bytes beats bytes without a record.
    pub async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let object = self.load(id).await?;

        match self
            .backend_for(object.backend)
            .delete(&object.relative_path)
            .await
        {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(
                    id = %id,
                    key = %object.relative_path,
                    backend = %object.backend,
                    "Bytes already missing, dropping record anyway"
                );
            }
            Err(e) => {
                tracing::error!(
                    id = %id,
                    key = %object.relative_path,
                    backend = %object.backend,
                    error = %e,
                    "Byte deletion failed, record retained"
                );
                return Err(StoreError::Backend(e));
            }
        }

        self.metadata.delete(id).await.map_err(StoreError::Metadata)
    }

    async fn load(&self, id: Uuid) -> Result<StoredObject, StoreError> {
        self.metadata
            .get(id)
            .await
            .map_err(StoreError::Metadata)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn backend_for(&self, backend: StorageBackend) -> &dyn ObjectStore {
        match backend {
            StorageBackend::Ftp => self.remote.as_ref(),
            StorageBackend::Local => self.local.as_ref(),
        }
    }

    /// Remote first, local on failure — strictly sequential, never in
    /// parallel. Returns which backend took the bytes and the public URL
    /// it serves them under.
    async fn write_bytes(
        &self,
        source: &Path,
        relative_path: &str,
    ) -> Result<(StorageBackend, String), StoreError> {
        match self.remote.upload(source, relative_path).await {
            Ok(url) => Ok((self.remote.backend_type(), url)),
            Err(remote_err) if remote_err.is_fallback_eligible() => {
                tracing::warn!(
                    key = %relative_path,
                    error = %remote_err,
                    "Remote upload failed, falling back to local storage"
                );
                match self.local.upload(source, relative_path).await {
                    Ok(url) => Ok((self.local.backend_type(), url)),
                    Err(local_err) => {
                        tracing::error!(
                            key = %relative_path,
                            remote_error = %remote_err,
                            local_error = %local_err,
                            "Local fallback failed, nothing stored"
                        );
                        Err(StoreError::Unavailable {
                            remote: remote_err,
                            local: local_err,
                        })
                    }
                }
            }
            Err(e) => Err(StoreError::Backend(e)),
        }
    }
}
