use super::file_secure_storage::FileSecureStorage;
use super::secure_storage::{KeyringSecureStorage, SecureStorage};
use crate::application::ports::DeviceKeyStore;
use crate::domain::value_objects::DeviceKey;
use crate::shared::config::{KeyStoreBackend, KeyStoreConfig};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Device key persisted in a [`SecureStorage`] backend as base64.
/// Creation is serialized so racing callers all observe the same key.
pub struct SecureDeviceKeyStore {
    storage: Arc<dyn SecureStorage>,
    key_id: String,
    cached: RwLock<Option<DeviceKey>>,
    creation: Mutex<()>,
}

impl SecureDeviceKeyStore {
    pub fn new(storage: Arc<dyn SecureStorage>, key_id: impl Into<String>) -> Self {
        Self {
            storage,
            key_id: key_id.into(),
            cached: RwLock::new(None),
            creation: Mutex::new(()),
        }
    }

    pub fn from_config(config: &KeyStoreConfig) -> Self {
        let storage: Arc<dyn SecureStorage> = match config.backend {
            KeyStoreBackend::Keyring => {
                Arc::new(KeyringSecureStorage::new(config.service_name.clone()))
            }
            KeyStoreBackend::File => Arc::new(FileSecureStorage::new(config.key_dir.clone())),
        };
        Self::new(storage, config.key_id.clone())
    }

    async fn load(&self) -> Result<Option<DeviceKey>, AppError> {
        let stored = self
            .storage
            .retrieve(&self.key_id)
            .await
            .map_err(|e| AppError::KeyStore(format!("{e:#}")))?;
        stored
            .map(|encoded| {
                DeviceKey::from_base64(&encoded)
                    .map_err(|e| AppError::KeyStore(format!("Stored device key is corrupt: {e}")))
            })
            .transpose()
    }
}

#[async_trait]
impl DeviceKeyStore for SecureDeviceKeyStore {
    async fn get_or_create_key(&self) -> Result<DeviceKey, AppError> {
        if let Some(key) = self.cached.read().await.as_ref() {
            return Ok(key.clone());
        }

        let _guard = self.creation.lock().await;
        if let Some(key) = self.cached.read().await.as_ref() {
            return Ok(key.clone());
        }

        let key = match self.load().await? {
            Some(key) => {
                debug!(target: "offline::key_store", key_id = %self.key_id, "device key loaded");
                key
            }
            None => {
                let key = DeviceKey::generate();
                self.storage
                    .store(&self.key_id, &key.to_base64())
                    .await
                    .map_err(|e| AppError::KeyStore(format!("{e:#}")))?;
                info!(target: "offline::key_store", key_id = %self.key_id, "device key created");
                key
            }
        };

        *self.cached.write().await = Some(key.clone());
        Ok(key)
    }

    async fn clear_key(&self) -> Result<(), AppError> {
        let _guard = self.creation.lock().await;
        self.storage
            .delete(&self.key_id)
            .await
            .map_err(|e| AppError::KeyStore(format!("{e:#}")))?;
        *self.cached.write().await = None;
        info!(target: "offline::key_store", key_id = %self.key_id, "device key cleared");
        Ok(())
    }
}
