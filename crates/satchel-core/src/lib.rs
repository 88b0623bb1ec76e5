//! Satchel Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! shared across the Satchel blob-storage components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{FtpConfig, LocalStorageConfig, StorageConfig};
pub use error::AppError;
pub use models::StoredObject;
pub use storage_types::StorageBackend;
