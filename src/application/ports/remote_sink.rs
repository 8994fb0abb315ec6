use crate::domain::value_objects::{QueueActionType, QueuePayload};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Remote writes, one per queueable action type.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    async fn upsert_check_in(&self, payload: &QueuePayload) -> Result<(), AppError>;
    async fn insert_attendance(&self, payload: &QueuePayload) -> Result<(), AppError>;
    async fn insert_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError>;
    async fn delete_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError>;
}

/// Routes a decrypted payload to the sink operation for its type.
pub async fn dispatch(
    sink: &dyn RemoteSink,
    action_type: &QueueActionType,
    payload: &QueuePayload,
) -> Result<(), AppError> {
    match action_type {
        QueueActionType::CheckIn => sink.upsert_check_in(payload).await,
        QueueActionType::Attendance => sink.insert_attendance(payload).await,
        QueueActionType::SaveProgram => sink.insert_saved_program(payload).await,
        QueueActionType::UnsaveProgram => sink.delete_saved_program(payload).await,
        QueueActionType::Unknown(other) => Err(AppError::UnknownActionType(other.clone())),
    }
}
