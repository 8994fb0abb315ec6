pub mod entities;
pub mod value_objects;

pub use entities::{QueueEntry, QueuedAction, SyncOutcome, SyncReport};
pub use value_objects::{DeviceKey, QueueActionType, QueueEntryId, QueuePayload};
