//! Domain models
//!
//! `StoredObject` is the persisted description of one uploaded file,
//! independent of which backend holds its bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A durably stored, immutable binary object.
///
/// Created once on a successful store and never mutated; replacing an
/// attachment creates a new object. `relative_path` is the internal
/// storage key (`{year}/{month}/{file_name}`); consumers outside the
/// storage subsystem fetch bytes through `public_url` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: Uuid,
    /// Caller-supplied filename, kept for display and download headers.
    pub original_name: String,
    /// Caller-asserted MIME type; opaque to storage (trust boundary).
    pub content_type: String,
    /// Number of bytes actually written to the backend.
    pub size_bytes: i64,
    /// Year/month-sharded storage key, immutable once written.
    pub relative_path: String,
    /// Public address derived from `relative_path` and the owning
    /// backend's base URL.
    pub public_url: String,
    /// Which backend holds the authoritative bytes.
    pub backend: crate::StorageBackend,
    /// Optional owning message, set at creation.
    pub message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
