use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::QueueEntryId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, insertion-ordered storage for queue entries.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Fails with `AppError::DuplicateId` when the id is already stored.
    async fn add(&self, entry: &QueueEntry) -> Result<(), AppError>;
    async fn get(&self, id: &QueueEntryId) -> Result<Option<QueueEntry>, AppError>;
    /// Replaces an entry in place, keeping its enumeration position.
    async fn put(&self, entry: &QueueEntry) -> Result<(), AppError>;
    async fn delete(&self, id: &QueueEntryId) -> Result<bool, AppError>;
    async fn get_all(&self) -> Result<Vec<QueueEntry>, AppError>;
    async fn count(&self) -> Result<usize, AppError>;
    async fn clear(&self) -> Result<usize, AppError>;
}
