//! Configuration module
//!
//! Environment-driven configuration for the storage subsystem: the FTP
//! remote backend, the local fallback backend, and the metadata database.
//! Read once at startup and passed explicitly into the backend factory and
//! the orchestrator; nothing reads the environment after that.

use std::env;

const DEFAULT_FTP_PORT: u16 = 21;
const DEFAULT_FTP_TIMEOUT_SECS: u64 = 15;

/// FTP remote backend settings.
#[derive(Clone, Debug)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Upgrade the control/data connections to TLS (FTPS) after connect.
    pub secure: bool,
    /// Remote directory under which the year/month shards live.
    pub root_dir: String,
    /// Base URL from which stored objects are publicly served.
    pub base_url: String,
    /// Per-operation timeout; a hung server degrades to the local
    /// fallback within this bound.
    pub timeout_secs: u64,
}

/// Local fallback backend settings.
#[derive(Clone, Debug)]
pub struct LocalStorageConfig {
    /// Root directory for sharded object files.
    pub root_dir: String,
    /// Base URL of the static-file layer serving `root_dir`.
    pub base_url: String,
}

/// Storage subsystem configuration.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub ftp: FtpConfig,
    pub local: LocalStorageConfig,
    pub database_url: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let ftp = FtpConfig {
            host: env::var("FTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("FTP_PORT")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("Invalid FTP_PORT: {}", e))?
                .unwrap_or(DEFAULT_FTP_PORT),
            username: env::var("FTP_USERNAME").unwrap_or_else(|_| "anonymous".to_string()),
            password: env::var("FTP_PASSWORD").unwrap_or_default(),
            secure: env::var("FTP_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            root_dir: env::var("FTP_ROOT_DIR").unwrap_or_else(|_| "files".to_string()),
            base_url: env::var("FTP_BASE_URL")
                .map_err(|_| anyhow::anyhow!("FTP_BASE_URL must be set"))?,
            timeout_secs: env::var("FTP_TIMEOUT_SECS")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .map_err(|e| anyhow::anyhow!("Invalid FTP_TIMEOUT_SECS: {}", e))?
                .unwrap_or(DEFAULT_FTP_TIMEOUT_SECS),
        };

        let local = LocalStorageConfig {
            root_dir: env::var("LOCAL_STORAGE_PATH")
                .map_err(|_| anyhow::anyhow!("LOCAL_STORAGE_PATH must be set"))?,
            base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .map_err(|_| anyhow::anyhow!("LOCAL_STORAGE_BASE_URL must be set"))?,
        };

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let config = StorageConfig {
            ftp,
            local,
            database_url,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.ftp.host.is_empty() {
            anyhow::bail!("FTP_HOST must not be empty");
        }
        if self.ftp.timeout_secs == 0 {
            anyhow::bail!("FTP_TIMEOUT_SECS must be greater than zero");
        }
        if self.local.root_dir.is_empty() {
            anyhow::bail!("LOCAL_STORAGE_PATH must not be empty");
        }
        Ok(())
    }
}
