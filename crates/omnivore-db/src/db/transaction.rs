//! Scoped database transactions

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;

/// Run `f` inside a transaction: commit when it returns `Ok`, roll back
/// otherwise.
///
/// ```ignore
/// use omnivore_db::with_transaction;
///
/// async fn touch(pool: &sqlx::PgPool, id: uuid::Uuid) -> anyhow::Result<u64> {
///     with_transaction(pool, |tx| {
///         Box::pin(async move {
///             let result = sqlx::query("UPDATE pages SET updated_at = NOW() WHERE id = $1")
///                 .bind(id)
///                 .execute(&mut **tx)
///                 .await?;
///             Ok::<_, sqlx::Error>(result.rows_affected())
///         })
///     })
///     .await
/// }
/// ```
pub async fn with_transaction<F, R, E>(pool: &PgPool, f: F) -> Result<R>
where
    F: for<'a> FnOnce(
        &'a mut Transaction<'_, Postgres>,
    ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'a>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await.context("Failed to commit transaction")?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Failed to roll back transaction");
            }
            Err(anyhow::Error::from(e))
        }
    }
}
