#[cfg(feature = "storage-ftp")]
use crate::FtpStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{ObjectStore, StorageBackend, StorageResult};
use satchel_core::StorageConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(
    config: &StorageConfig,
    backend: StorageBackend,
) -> StorageResult<Arc<dyn ObjectStore>> {
    match backend {
        #[cfg(feature = "storage-ftp")]
        StorageBackend::Ftp => Ok(Arc::new(FtpStorage::new(config.ftp.clone()))),

        #[cfg(not(feature = "storage-ftp"))]
        StorageBackend::Ftp => Err(crate::StorageError::Config(
            "FTP storage backend not available (storage-ftp feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local.root_dir.clone(),
                config.local.base_url.clone(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(crate::StorageError::Config(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
