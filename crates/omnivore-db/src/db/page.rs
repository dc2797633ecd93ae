use chrono::{DateTime, Utc};
use omnivore_core::models::{NewPage, Page};
use omnivore_core::AppError;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::transaction::with_transaction;

/// Trait for page operations used by the upload workflow
#[async_trait::async_trait]
pub trait PageRepositoryTrait: Send + Sync {
    /// Most recently saved page of `user_id` whose original URL is `url`
    async fn find_by_user_and_url(&self, user_id: Uuid, url: &str)
        -> Result<Option<Page>, AppError>;

    /// Mark an existing page as saved again at `now` and unarchive it.
    /// Returns `false` when no page was updated.
    async fn revive(&self, page_id: &str, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Insert a page and return its id. An empty `page.id` is replaced with a
    /// fresh UUID.
    async fn create(&self, page: NewPage) -> Result<Option<String>, AppError>;
}

#[derive(Clone)]
pub struct PostgresPageRepository {
    pool: PgPool,
}

impl PostgresPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PageRepositoryTrait for PostgresPageRepository {
    #[tracing::instrument(skip(self, url), fields(user_id = %user_id))]
    async fn find_by_user_and_url(
        &self,
        user_id: Uuid,
        url: &str,
    ) -> Result<Option<Page>, AppError> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT
                id, user_id, original_url, title, slug, hash, content, page_type,
                upload_file_id, state, reading_progress_percent,
                reading_progress_anchor_index, created_at, saved_at, archived_at,
                updated_at
            FROM pages
            WHERE user_id = $1 AND original_url = $2 AND state <> 'DELETED'
            ORDER BY saved_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(page)
    }

    #[tracing::instrument(skip(self), fields(page_id = %page_id))]
    async fn revive(&self, page_id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let page_id = page_id.to_string();

        let rows_affected = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let result = sqlx::query(
                    r#"
                    UPDATE pages
                    SET saved_at = $2, archived_at = NULL, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(page_id)
                .bind(now)
                .execute(&mut **tx)
                .await?;
                Ok::<_, sqlx::Error>(result.rows_affected())
            })
        })
        .await?;

        Ok(rows_affected > 0)
    }

    #[tracing::instrument(skip(self, page), fields(user_id = %page.user_id))]
    async fn create(&self, page: NewPage) -> Result<Option<String>, AppError> {
        let id = if page.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            page.id.clone()
        };

        let row = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                sqlx::query(
                    r#"
                    INSERT INTO pages (
                        id, user_id, original_url, title, slug, hash, content,
                        page_type, upload_file_id, state, reading_progress_percent,
                        reading_progress_anchor_index, created_at, saved_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    RETURNING id
                    "#,
                )
                .bind(id)
                .bind(page.user_id)
                .bind(page.original_url)
                .bind(page.title)
                .bind(page.slug)
                .bind(page.hash)
                .bind(page.content)
                .bind(page.page_type)
                .bind(page.upload_file_id)
                .bind(page.state)
                .bind(page.reading_progress_percent)
                .bind(page.reading_progress_anchor_index)
                .bind(page.created_at)
                .bind(page.saved_at)
                .fetch_optional(&mut **tx)
                .await
            })
        })
        .await?;

        match row {
            Some(row) => {
                let id: String = row.try_get("id")?;
                tracing::debug!(page_id = %id, "Page created");
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }
}
