pub mod offline_queue;

pub use offline_queue::{OfflineQueueService, QueueSettings};
