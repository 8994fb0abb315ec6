use crate::domain::value_objects::{DeviceKey, EncryptedPayload, QueuePayload};
use crate::shared::error::AppError;

pub trait PayloadCipher: Send + Sync {
    fn encrypt(
        &self,
        payload: &QueuePayload,
        key: &DeviceKey,
    ) -> Result<EncryptedPayload, AppError>;
    fn decrypt(
        &self,
        ciphertext: &EncryptedPayload,
        key: &DeviceKey,
    ) -> Result<QueuePayload, AppError>;
}
