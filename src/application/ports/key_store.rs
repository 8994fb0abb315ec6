use crate::domain::value_objects::DeviceKey;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait DeviceKeyStore: Send + Sync {
    /// Returns the persisted key, creating and persisting one on first use.
    async fn get_or_create_key(&self) -> Result<DeviceKey, AppError>;
    async fn clear_key(&self) -> Result<(), AppError>;
}
