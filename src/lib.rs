//! Encrypted offline action queue for the Room XI app.
//!
//! Actions recorded without connectivity are sealed with a per-device key,
//! persisted in SQLite and replayed against the backend once the device is
//! back online.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::services::{OfflineQueueService, QueueSettings};
pub use domain::entities::{
    QueueEntry, QueuedAction, SkipReason, SubmitOutcome, SyncOutcome, SyncReport,
};
pub use domain::value_objects::{QueueActionType, QueueEntryId, QueuePayload};
pub use shared::{AppConfig, AppError, Result};

/// Used when `RUST_LOG` is unset. Queue logs use `offline::*` targets, not the crate path.
pub const DEFAULT_LOG_FILTER: &str = "room_xi_offline=debug,offline=debug,info";

/// Installs the fmt subscriber. Safe to call more than once.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
