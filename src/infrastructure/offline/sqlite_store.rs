use super::queries::{
    COUNT_ENTRIES, DELETE_ALL_ENTRIES, DELETE_ENTRY, INSERT_ENTRY, SELECT_ALL_ENTRIES,
    SELECT_ENTRY_BY_ID, UPSERT_ENTRY,
};
use super::rows::QueueEntryRow;
use crate::application::ports::QueueStore;
use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::QueueEntryId;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tracing::debug;

pub struct SqliteQueueStore {
    pool: ConnectionPool,
}

impl SqliteQueueStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn add(&self, entry: &QueueEntry) -> Result<(), AppError> {
        let result = sqlx::query(INSERT_ENTRY)
            .bind(entry.id.as_str())
            .bind(entry.action_type.as_str())
            .bind(entry.payload_ciphertext.as_str())
            .bind(entry.created_at.timestamp_millis())
            .bind(i64::from(entry.attempt_count))
            .bind(entry.last_error.as_deref())
            .execute(self.pool.get_pool())
            .await;

        match result {
            Ok(_) => {
                debug!(
                    target: "offline::store",
                    entry_id = %entry.id,
                    action_type = %entry.action_type,
                    "queue entry stored"
                );
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::DuplicateId(entry.id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: &QueueEntryId) -> Result<Option<QueueEntry>, AppError> {
        let row = sqlx::query_as::<_, QueueEntryRow>(SELECT_ENTRY_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(QueueEntryRow::into_domain).transpose()
    }

    async fn put(&self, entry: &QueueEntry) -> Result<(), AppError> {
        sqlx::query(UPSERT_ENTRY)
            .bind(entry.id.as_str())
            .bind(entry.action_type.as_str())
            .bind(entry.payload_ciphertext.as_str())
            .bind(entry.created_at.timestamp_millis())
            .bind(i64::from(entry.attempt_count))
            .bind(entry.last_error.as_deref())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &QueueEntryId) -> Result<bool, AppError> {
        let result = sqlx::query(DELETE_ENTRY)
            .bind(id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_all(&self) -> Result<Vec<QueueEntry>, AppError> {
        let rows = sqlx::query_as::<_, QueueEntryRow>(SELECT_ALL_ENTRIES)
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.into_iter().map(QueueEntryRow::into_domain).collect()
    }

    async fn count(&self) -> Result<usize, AppError> {
        let (count,): (i64,) = sqlx::query_as(COUNT_ENTRIES)
            .fetch_one(self.pool.get_pool())
            .await?;
        Ok(count.max(0) as usize)
    }

    async fn clear(&self) -> Result<usize, AppError> {
        let result = sqlx::query(DELETE_ALL_ENTRIES)
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected() as usize)
    }
}
