use crate::traits::{ObjectStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// The fallback backend: writes sharded object files under a configured
/// root that a separate static-file layer serves at `base_url`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/satchel/files")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a relative path to a filesystem path with security validation
    ///
    /// Rejects paths that could escape the base storage directory.
    fn resolve(&self, relative_path: &str) -> StorageResult<PathBuf> {
        if relative_path.contains("..") || relative_path.starts_with('/') {
            return Err(StorageError::InvalidPath(
                "Storage path contains invalid components".to_string(),
            ));
        }

        Ok(self.base_path.join(relative_path))
    }

    /// Ensure the year/month shard directory exists. `create_dir_all`
    /// creates all missing intermediates in one step and treats an
    /// already-existing directory as success.
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Unavailable(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn upload(&self, source: &Path, relative_path: &str) -> StorageResult<String> {
        let path = self.resolve(relative_path)?;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let data = fs::read(source).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to read staged file {}: {}",
                source.display(),
                e
            ))
        })?;
        let size = data.len();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.public_url(relative_path);

        tracing::info!(
            path = %path.display(),
            key = %relative_path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn download(&self, relative_path: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(relative_path)?;
        let start = std::time::Instant::now();

        // Only a missing file is NotFound; any other read error (bad
        // permissions, shard path shadowed by a file) is a real failure.
        let data = fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(relative_path.to_string()),
            _ => StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            )),
        })?;

        tracing::info!(
            path = %path.display(),
            key = %relative_path,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, relative_path: &str) -> StorageResult<()> {
        let path = self.resolve(relative_path)?;
        let start = std::time::Instant::now();

        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(relative_path.to_string()),
            _ => StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            )),
        })?;

        tracing::info!(
            path = %path.display(),
            key = %relative_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, relative_path: &str) -> StorageResult<bool> {
        let path = self.resolve(relative_path)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, relative_path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), relative_path)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000/files".to_string())
            .await
            .unwrap()
    }

    async fn stage(dir: &Path, data: &[u8]) -> PathBuf {
        let path = dir.join("staged.bin");
        fs::write(&path, data).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_download_round_trip() {
        let root = tempdir().unwrap();
        let staging = tempdir().unwrap();
        let storage = storage(root.path()).await;

        let data = b"test data".to_vec();
        let source = stage(staging.path(), &data).await;

        let url = storage.upload(&source, "2026/01/att-abc.txt").await.unwrap();
        assert_eq!(url, "http://localhost:3000/files/2026/01/att-abc.txt");

        let downloaded = storage.download("2026/01/att-abc.txt").await.unwrap();
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_shard_directories_created() {
        let root = tempdir().unwrap();
        let staging = tempdir().unwrap();
        let storage = storage(root.path()).await;

        let source = stage(staging.path(), b"x").await;
        storage.upload(&source, "2027/12/att-xyz.bin").await.unwrap();

        assert!(root.path().join("2027").join("12").join("att-xyz.bin").is_file());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let root = tempdir().unwrap();
        let storage = storage(root.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let root = tempdir().unwrap();
        let storage = storage(root.path()).await;

        let result = storage.download("2026/01/nope.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_io_error_is_not_reported_as_missing() {
        let root = tempdir().unwrap();
        let storage = storage(root.path()).await;

        // A regular file shadowing the year shard: reads and deletes
        // through it fail with a directory error, not absence.
        fs::write(root.path().join("2026"), b"not a directory")
            .await
            .unwrap();

        let result = storage.download("2026/01/att-abc.txt").await;
        assert!(matches!(result, Err(StorageError::DownloadFailed(_))));

        let result = storage.delete("2026/01/att-abc.txt").await;
        assert!(matches!(result, Err(StorageError::DeleteFailed(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let root = tempdir().unwrap();
        let staging = tempdir().unwrap();
        let storage = storage(root.path()).await;

        let source = stage(staging.path(), b"gone soon").await;
        storage.upload(&source, "2026/02/att-del.txt").await.unwrap();

        storage.delete("2026/02/att-del.txt").await.unwrap();
        assert!(!storage.exists("2026/02/att-del.txt").await.unwrap());

        let result = storage.delete("2026/02/att-del.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_length_object() {
        let root = tempdir().unwrap();
        let staging = tempdir().unwrap();
        let storage = storage(root.path()).await;

        let source = stage(staging.path(), b"").await;
        storage.upload(&source, "2026/03/att-empty").await.unwrap();

        let downloaded = storage.download("2026/03/att-empty").await.unwrap();
        assert!(downloaded.is_empty());
    }
}
