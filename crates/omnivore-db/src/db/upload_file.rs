use omnivore_core::models::{NewUploadFile, UploadFile, UploadFileStatus};
use omnivore_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::transaction::with_transaction;

/// Trait for upload record operations
#[async_trait::async_trait]
pub trait UploadFileRepositoryTrait: Send + Sync {
    /// Insert a new upload record with status `INITIALIZED`.
    /// `None` means the insert produced no row.
    async fn create(&self, upload: NewUploadFile) -> Result<Option<UploadFile>, AppError>;

    /// Point the record at the stored object's public URL and reset it to
    /// `INITIALIZED`.
    async fn swap_public_url(
        &self,
        upload_id: Uuid,
        public_url: &str,
    ) -> Result<Option<UploadFile>, AppError>;

    async fn update_status(
        &self,
        upload_id: Uuid,
        status: UploadFileStatus,
    ) -> Result<Option<UploadFile>, AppError>;
}

#[derive(Clone)]
pub struct PostgresUploadFileRepository {
    pool: PgPool,
}

impl PostgresUploadFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const UPLOAD_FILE_COLUMNS: &str =
    "id, user_id, url, file_name, content_type, status, created_at, updated_at";

#[async_trait::async_trait]
impl UploadFileRepositoryTrait for PostgresUploadFileRepository {
    #[tracing::instrument(skip(self, upload), fields(user_id = %upload.user_id))]
    async fn create(&self, upload: NewUploadFile) -> Result<Option<UploadFile>, AppError> {
        let sql = format!(
            r#"
            INSERT INTO upload_files (id, user_id, url, file_name, content_type, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            UPLOAD_FILE_COLUMNS
        );

        let row = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                sqlx::query_as::<_, UploadFile>(&sql)
                    .bind(Uuid::new_v4())
                    .bind(upload.user_id)
                    .bind(upload.url)
                    .bind(upload.file_name)
                    .bind(upload.content_type)
                    .bind(UploadFileStatus::Initialized)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await?;

        if let Some(ref created) = row {
            tracing::debug!(upload_file_id = %created.id, "Upload file record created");
        }

        Ok(row)
    }

    #[tracing::instrument(skip(self, public_url), fields(upload_file_id = %upload_id))]
    async fn swap_public_url(
        &self,
        upload_id: Uuid,
        public_url: &str,
    ) -> Result<Option<UploadFile>, AppError> {
        let sql = format!(
            r#"
            UPDATE upload_files
            SET url = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            UPLOAD_FILE_COLUMNS
        );
        let public_url = public_url.to_string();

        let row = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                sqlx::query_as::<_, UploadFile>(&sql)
                    .bind(upload_id)
                    .bind(public_url)
                    .bind(UploadFileStatus::Initialized)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(upload_file_id = %upload_id))]
    async fn update_status(
        &self,
        upload_id: Uuid,
        status: UploadFileStatus,
    ) -> Result<Option<UploadFile>, AppError> {
        let sql = format!(
            r#"
            UPDATE upload_files
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            UPLOAD_FILE_COLUMNS
        );

        let row = sqlx::query_as::<_, UploadFile>(&sql)
            .bind(upload_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}
