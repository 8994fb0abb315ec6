pub mod action_type;
pub mod encrypted_payload;
pub mod entry_id;
pub mod payload;
pub mod retry_policy;

pub use action_type::QueueActionType;
pub use encrypted_payload::EncryptedPayload;
pub use entry_id::QueueEntryId;
pub use payload::QueuePayload;
pub use retry_policy::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAYS_MS, RetryPolicy};
