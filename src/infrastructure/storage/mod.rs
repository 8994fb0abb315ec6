pub mod device_key_store;
pub mod file_secure_storage;
pub mod secure_storage;

pub use device_key_store::SecureDeviceKeyStore;
pub use file_secure_storage::FileSecureStorage;
pub use secure_storage::{KeyringSecureStorage, SecureStorage};
