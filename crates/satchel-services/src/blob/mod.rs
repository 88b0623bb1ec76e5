pub mod service;

pub use service::{BlobStorageService, NewUpload};
