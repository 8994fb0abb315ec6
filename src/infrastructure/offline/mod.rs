pub mod metrics;
mod queries;
mod rows;
pub mod sqlite_store;

pub use metrics::{
    DeliveryOutcomeMetadata, DeliveryOutcomeStatus, QueueMetrics, QueueMetricsSnapshot,
};
pub use sqlite_store::SqliteQueueStore;
