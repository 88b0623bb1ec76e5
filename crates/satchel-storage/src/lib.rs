//! Satchel Storage Library
//!
//! This crate provides the storage abstraction and backend implementations
//! for Satchel. It includes the `ObjectStore` trait, an FTP backend, and a
//! local filesystem backend.
//!
//! # Storage path format
//!
//! Objects are addressed by a date-sharded relative path shared by all
//! backends:
//!
//! - `{year}/{month}/{file_name}` with a zero-padded month
//! - `file_name` is a generated `att-{token}` name carrying the original
//!   file's extension
//!
//! Paths must not contain `..` or a leading `/`. Path generation is
//! centralized in the `naming` module so all backends stay consistent.

pub mod factory;
#[cfg(feature = "storage-ftp")]
pub mod ftp;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod naming;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-ftp")]
pub use ftp::FtpStorage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use naming::ObjectName;
pub use satchel_core::StorageBackend;
pub use traits::{ObjectStore, StorageError, StorageResult};
