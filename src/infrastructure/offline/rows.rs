use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::{EncryptedPayload, QueueActionType, QueueEntryId};
use crate::shared::error::AppError;
use chrono::{TimeZone, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub(super) struct QueueEntryRow {
    pub id: String,
    pub action_type: String,
    pub payload_ciphertext: String,
    pub created_at: i64,
    pub attempt_count: i64,
    pub last_error: Option<String>,
}

impl QueueEntryRow {
    pub fn into_domain(self) -> Result<QueueEntry, AppError> {
        let id = QueueEntryId::new(self.id)
            .map_err(|err| AppError::StorageUnavailable(format!("Invalid queue entry id: {err}")))?;
        let payload_ciphertext = EncryptedPayload::new(self.payload_ciphertext).map_err(|err| {
            AppError::StorageUnavailable(format!("Invalid ciphertext for {id}: {err}"))
        })?;
        let created_at = Utc
            .timestamp_millis_opt(self.created_at)
            .single()
            .ok_or_else(|| {
                AppError::StorageUnavailable(format!("Invalid created_at for {id}"))
            })?;
        let attempt_count = u32::try_from(self.attempt_count).map_err(|_| {
            AppError::StorageUnavailable(format!(
                "Invalid attempt_count {} for {id}",
                self.attempt_count
            ))
        })?;

        Ok(QueueEntry {
            id,
            action_type: QueueActionType::from(self.action_type),
            payload_ciphertext,
            created_at,
            attempt_count,
            last_error: self.last_error,
        })
    }
}
