use anyhow::{Context, Result};
use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, error};

/// Small secret store keyed by name. Backends never log values.
#[async_trait]
pub trait SecureStorage: Send + Sync {
    async fn store(&self, key: &str, value: &str) -> Result<()>;
    async fn retrieve(&self, key: &str) -> Result<Option<String>>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// OS credential store (Keychain, Credential Manager, Secret Service/keyutils).
pub struct KeyringSecureStorage {
    service_name: String,
}

impl KeyringSecureStorage {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).context("Failed to create keyring entry")
    }
}

#[async_trait]
impl SecureStorage for KeyringSecureStorage {
    async fn store(&self, key: &str, value: &str) -> Result<()> {
        debug!(target: "offline::key_store", service = %self.service_name, key, "writing keyring entry");
        match self.entry(key)?.set_password(value) {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(target: "offline::key_store", key, error = %e, "failed to write keyring entry");
                Err(anyhow::anyhow!("Failed to save {key} to keyring: {e}"))
            }
        }
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(anyhow::anyhow!("Failed to read {key} from keyring: {e}")),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Failed to delete {key} from keyring: {e}")),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.retrieve(key).await?.is_some())
    }
}
