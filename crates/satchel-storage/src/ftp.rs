//! FTP remote backend.
//!
//! Each operation opens a fresh session (connect, optional TLS upgrade,
//! login), runs inside `with_session` so the session is closed on every
//! exit path, and maps protocol errors into the crate error taxonomy.
//! The underlying client is blocking, so operations run on the blocking
//! thread pool with a deadline; a hung server surfaces as `Unavailable`
//! within a bounded time instead of stalling the calling request.

use crate::traits::{ObjectStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use satchel_core::FtpConfig;
use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use suppaftp::native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{FtpError, Mode, NativeTlsConnector, NativeTlsFtpStream, Status};

/// FTP storage implementation
#[derive(Clone)]
pub struct FtpStorage {
    config: FtpConfig,
}

impl FtpStorage {
    pub fn new(config: FtpConfig) -> Self {
        FtpStorage { config }
    }

    /// Split a relative path into shard directories (remote root first)
    /// and the file name, rejecting traversal attempts.
    fn split_path(config: &FtpConfig, relative_path: &str) -> StorageResult<(Vec<String>, String)> {
        if relative_path.contains("..") || relative_path.starts_with('/') {
            return Err(StorageError::InvalidPath(
                "Storage path contains invalid components".to_string(),
            ));
        }

        let mut segments: Vec<String> = config
            .root_dir
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let mut parts: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();

        let file_name = match parts.pop() {
            Some(name) => name.to_string(),
            None => {
                return Err(StorageError::InvalidPath(
                    "Storage path has no file name".to_string(),
                ))
            }
        };
        segments.extend(parts.into_iter().map(String::from));

        Ok((segments, file_name))
    }

    /// Connect, optionally upgrade to TLS, and authenticate.
    fn open_session(config: &FtpConfig) -> StorageResult<NativeTlsFtpStream> {
        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| {
                StorageError::Unavailable(format!(
                    "Failed to resolve {}:{}: {}",
                    config.host, config.port, e
                ))
            })?
            .next()
            .ok_or_else(|| {
                StorageError::Unavailable(format!(
                    "No address found for {}:{}",
                    config.host, config.port
                ))
            })?;

        let stream =
            NativeTlsFtpStream::connect_timeout(addr, Duration::from_secs(config.timeout_secs))
                .map_err(|e| StorageError::Unavailable(format!("FTP connect failed: {}", e)))?;

        let mut stream = if config.secure {
            let tls = TlsConnector::new()
                .map_err(|e| StorageError::Unavailable(format!("TLS setup failed: {}", e)))?;
            stream
                .into_secure(NativeTlsConnector::from(tls), &config.host)
                .map_err(|e| {
                    StorageError::Unavailable(format!("FTPS negotiation failed: {}", e))
                })?
        } else {
            stream
        };

        stream
            .login(&config.username, &config.password)
            .map_err(|e| StorageError::Unavailable(format!("FTP login failed: {}", e)))?;
        stream.set_mode(Mode::Passive);
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| StorageError::Unavailable(format!("FTP binary mode failed: {}", e)))?;

        Ok(stream)
    }

    /// Run `op` against a fresh session. The session is quit on every
    /// exit path, including operation failure.
    fn with_session<T>(
        config: &FtpConfig,
        op: impl FnOnce(&mut NativeTlsFtpStream) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut ftp = Self::open_session(config)?;
        let result = op(&mut ftp);
        if let Err(e) = ftp.quit() {
            tracing::debug!(error = %e, "FTP quit failed");
        }
        result
    }

    /// Enter `dir`, creating it when entering fails. A concurrent creator
    /// may win the mkdir race; only the re-entry result matters. Failure
    /// to enter after creation means the backend is unusable.
    fn ensure_dir(ftp: &mut NativeTlsFtpStream, dir: &str) -> StorageResult<()> {
        if ftp.cwd(dir).is_ok() {
            return Ok(());
        }

        if let Err(e) = ftp.mkdir(dir) {
            tracing::debug!(dir = %dir, error = %e, "FTP mkdir failed, retrying cwd");
        }

        ftp.cwd(dir).map_err(|e| {
            StorageError::Unavailable(format!("Cannot enter directory {}: {}", dir, e))
        })
    }

    /// Enter `dir` without creating it; a missing shard directory means
    /// the object is missing.
    fn enter_dir(
        ftp: &mut NativeTlsFtpStream,
        dir: &str,
        relative_path: &str,
    ) -> StorageResult<()> {
        ftp.cwd(dir)
            .map_err(|_| StorageError::NotFound(relative_path.to_string()))
    }

    /// Staging name a transfer streams into before the rename into place.
    /// Dot-prefixed so directory listings of the shard skip it.
    fn staging_name(file_name: &str) -> String {
        format!(".{}.part", file_name)
    }

    /// Transfer under a staging name, then rename into place. Other
    /// readers never observe a partial or truncated file under the final
    /// name: a mid-transfer disconnect leaves only the staging name,
    /// which is removed best-effort before the error propagates.
    fn put_atomic(
        ftp: &mut NativeTlsFtpStream,
        file_name: &str,
        reader: &mut impl std::io::Read,
    ) -> StorageResult<u64> {
        let staging = Self::staging_name(file_name);

        let written = match ftp.put_file(&staging, reader) {
            Ok(written) => written,
            Err(e) => {
                if let Err(rm_err) = ftp.rm(&staging) {
                    tracing::debug!(name = %staging, error = %rm_err, "Failed to remove partial upload");
                }
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };

        if let Err(e) = ftp.rename(staging.as_str(), file_name) {
            if let Err(rm_err) = ftp.rm(&staging) {
                tracing::debug!(name = %staging, error = %rm_err, "Failed to remove staged upload");
            }
            return Err(StorageError::UploadFailed(format!(
                "Failed to move {} into place: {}",
                staging, e
            )));
        }

        Ok(written)
    }

    fn map_transfer_error(
        err: FtpError,
        relative_path: &str,
        wrap: fn(String) -> StorageError,
    ) -> StorageError {
        match err {
            FtpError::UnexpectedResponse(ref resp) if resp.status == Status::FileUnavailable => {
                StorageError::NotFound(relative_path.to_string())
            }
            other => wrap(other.to_string()),
        }
    }

    /// Run a blocking FTP job with a deadline. The connect step enforces
    /// its own timeout; the outer deadline additionally bounds a transfer
    /// that hangs after connecting.
    async fn run<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(FtpConfig) -> StorageResult<T> + Send + 'static,
    {
        let config = self.config.clone();
        let deadline = Duration::from_secs(config.timeout_secs.saturating_mul(4));

        match tokio::time::timeout(deadline, tokio::task::spawn_blocking(move || f(config))).await
        {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(StorageError::Unavailable(format!(
                "FTP worker failed: {}",
                join_err
            ))),
            Err(_) => Err(StorageError::Unavailable(format!(
                "FTP operation exceeded deadline of {:?}",
                deadline
            ))),
        }
    }
}

#[async_trait]
impl ObjectStore for FtpStorage {
    async fn upload(&self, source: &Path, relative_path: &str) -> StorageResult<String> {
        let (dirs, file_name) = Self::split_path(&self.config, relative_path)?;
        let source: PathBuf = source.to_path_buf();
        let key = relative_path.to_string();
        let start = std::time::Instant::now();

        let written = self
            .run(move |config| {
                let mut reader = std::fs::File::open(&source).map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to open staged file {}: {}",
                        source.display(),
                        e
                    ))
                })?;

                Self::with_session(&config, |ftp| {
                    for dir in &dirs {
                        Self::ensure_dir(ftp, dir)?;
                    }
                    Self::put_atomic(ftp, &file_name, &mut reader)
                })
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    host = %self.config.host,
                    key = %key,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "FTP upload failed"
                );
                e
            })?;

        let url = self.public_url(&key);

        tracing::info!(
            host = %self.config.host,
            key = %key,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FTP upload successful"
        );

        Ok(url)
    }

    async fn download(&self, relative_path: &str) -> StorageResult<Vec<u8>> {
        let (dirs, file_name) = Self::split_path(&self.config, relative_path)?;
        let key = relative_path.to_string();
        let start = std::time::Instant::now();

        let data = self
            .run(move |config| {
                Self::with_session(&config, |ftp| {
                    for dir in &dirs {
                        Self::enter_dir(ftp, dir, &key)?;
                    }
                    let buffer = ftp.retr_as_buffer(&file_name).map_err(|e| {
                        Self::map_transfer_error(e, &key, StorageError::DownloadFailed)
                    })?;
                    Ok(buffer.into_inner())
                })
            })
            .await?;

        tracing::info!(
            host = %self.config.host,
            key = %relative_path,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FTP download successful"
        );

        Ok(data)
    }

    async fn delete(&self, relative_path: &str) -> StorageResult<()> {
        let (dirs, file_name) = Self::split_path(&self.config, relative_path)?;
        let key = relative_path.to_string();
        let start = std::time::Instant::now();

        self.run(move |config| {
            Self::with_session(&config, |ftp| {
                for dir in &dirs {
                    Self::enter_dir(ftp, dir, &key)?;
                }
                ftp.rm(&file_name)
                    .map_err(|e| Self::map_transfer_error(e, &key, StorageError::DeleteFailed))
            })
        })
        .await?;

        tracing::info!(
            host = %self.config.host,
            key = %relative_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FTP delete successful"
        );

        Ok(())
    }

    async fn exists(&self, relative_path: &str) -> StorageResult<bool> {
        let (dirs, file_name) = Self::split_path(&self.config, relative_path)?;
        let key = relative_path.to_string();

        let result = self
            .run(move |config| {
                Self::with_session(&config, |ftp| {
                    for dir in &dirs {
                        Self::enter_dir(ftp, dir, &key)?;
                    }
                    ftp.size(&file_name)
                        .map_err(|e| Self::map_transfer_error(e, &key, StorageError::DownloadFailed))
                })
            })
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn public_url(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            relative_path
        )
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Ftp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FtpConfig {
        FtpConfig {
            host: "ftp.example.com".to_string(),
            port: 21,
            username: "satchel".to_string(),
            password: "secret".to_string(),
            secure: false,
            root_dir: "files".to_string(),
            base_url: "https://cdn.example.com/files/".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_split_path_includes_root() {
        let (dirs, file) = FtpStorage::split_path(&config(), "2026/01/att-abc.pdf").unwrap();
        assert_eq!(dirs, vec!["files", "2026", "01"]);
        assert_eq!(file, "att-abc.pdf");
    }

    #[test]
    fn test_split_path_multi_segment_root() {
        let mut cfg = config();
        cfg.root_dir = "srv/uploads".to_string();
        let (dirs, _) = FtpStorage::split_path(&cfg, "2026/01/att-abc.pdf").unwrap();
        assert_eq!(dirs, vec!["srv", "uploads", "2026", "01"]);
    }

    #[test]
    fn test_split_path_rejects_traversal() {
        let result = FtpStorage::split_path(&config(), "../2026/01/att.pdf");
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = FtpStorage::split_path(&config(), "/2026/01/att.pdf");
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[test]
    fn test_staging_name_is_distinct_and_hidden() {
        let staging = FtpStorage::staging_name("att-abc.pdf");
        assert_eq!(staging, ".att-abc.pdf.part");
        assert_ne!(staging, "att-abc.pdf");
        assert!(staging.starts_with('.'));
        // No path separators: the staging file lives in the same shard
        // directory the session already entered.
        assert!(!staging.contains('/'));
    }

    #[test]
    fn test_public_url_trims_trailing_slash() {
        let storage = FtpStorage::new(config());
        assert_eq!(
            storage.public_url("2026/01/att-abc.pdf"),
            "https://cdn.example.com/files/2026/01/att-abc.pdf"
        );
    }
}
