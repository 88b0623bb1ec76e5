//! Satchel Services Library
//!
//! The storage orchestrator: the public entry point for storing,
//! retrieving, and removing uploaded files. Tries the remote backend
//! first, degrades to the local backend on failure, and reconciles the
//! outcome with the metadata store.

pub mod blob;
pub mod error;

pub use blob::{BlobStorageService, NewUpload};
pub use error::StoreError;
