pub mod device_key;
pub mod offline;

pub use device_key::{DEVICE_KEY_LEN, DeviceKey};
pub use offline::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAYS_MS, EncryptedPayload, QueueActionType, QueueEntryId,
    QueuePayload, RetryPolicy,
};
