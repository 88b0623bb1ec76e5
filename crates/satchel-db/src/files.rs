//! File metadata repository: CRUD for the files table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use satchel_core::{AppError, StorageBackend, StoredObject};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Metadata persistence boundary consumed by the orchestrator.
///
/// No business logic lives behind this trait; it exists so the
/// orchestrator can run against an in-memory store in tests.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Persist a new record.
    async fn create(&self, object: &StoredObject) -> Result<(), AppError>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<StoredObject>, AppError>;

    /// Delete a record by id. Deleting an unknown id is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Row type for the files table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct FileRow {
    pub id: Uuid,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub relative_path: String,
    pub public_url: String,
    pub backend: StorageBackend,
    pub message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl FileRow {
    pub fn into_stored_object(self) -> StoredObject {
        StoredObject {
            id: self.id,
            original_name: self.original_name,
            content_type: self.content_type,
            size_bytes: self.size_bytes,
            relative_path: self.relative_path,
            public_url: self.public_url,
            backend: self.backend,
            message_id: self.message_id,
            created_at: self.created_at,
        }
    }
}

/// Repository for the files table.
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for FileRepository {
    #[tracing::instrument(skip(self, object), fields(db.table = "files", db.record_id = %object.id))]
    async fn create(&self, object: &StoredObject) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO files
              (id, original_name, content_type, size_bytes, relative_path,
               public_url, backend, message_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(object.id)
        .bind(&object.original_name)
        .bind(&object.content_type)
        .bind(object.size_bytes)
        .bind(&object.relative_path)
        .bind(&object.public_url)
        .bind(object.backend)
        .bind(object.message_id)
        .bind(object.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<StoredObject>, AppError> {
        let row: Option<FileRow> = sqlx::query_as::<Postgres, FileRow>(
            r#"
            SELECT id, original_name, content_type, size_bytes, relative_path,
                   public_url, backend, message_id, created_at
            FROM files WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_stored_object()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_to_domain() {
        let id = Uuid::new_v4();
        let row = FileRow {
            id,
            original_name: "report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 10,
            relative_path: "2026/01/att-abc.pdf".to_string(),
            public_url: "https://cdn.example.com/files/2026/01/att-abc.pdf".to_string(),
            backend: StorageBackend::Local,
            message_id: None,
            created_at: Utc::now(),
        };

        let object = row.into_stored_object();
        assert_eq!(object.id, id);
        assert_eq!(object.backend, StorageBackend::Local);
        assert_eq!(object.size_bytes, 10);
    }
}
