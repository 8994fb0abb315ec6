//! Encrypted write-behind queue for actions recorded while offline.
//!
//! Entries are encrypted with the device key, persisted, and replayed against the
//! [`RemoteSink`] once connectivity allows. Failed deliveries are retried with
//! backoff until the retry ceiling, after which they stay in the store for
//! inspection instead of being dropped.

mod connectivity;
mod core;
mod schedule;
mod sync;

use crate::application::ports::{
    Clock, ConnectivitySignal, DeviceKeyStore, PayloadCipher, QueueStore, RemoteSink,
};
use crate::domain::value_objects::RetryPolicy;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::offline::QueueMetrics;
use crate::shared::config::QueueConfig;
use crate::shared::error::AppError;
use schedule::{BackgroundTasks, RetrySchedule};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, watch};

pub use crate::domain::entities::{SkipReason, SubmitOutcome, SyncOutcome, SyncReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    pub retry: RetryPolicy,
    /// Delay between an online enqueue and the sync it triggers.
    pub enqueue_sync_delay: Duration,
    /// Settle time after an offline to online transition before syncing.
    pub reconnect_debounce: Duration,
}

impl QueueSettings {
    pub fn from_config(config: &QueueConfig) -> Result<Self, AppError> {
        let retry = RetryPolicy::new(config.max_retries, config.retry_delays())
            .map_err(AppError::ConfigurationError)?;
        Ok(Self {
            retry,
            enqueue_sync_delay: config.enqueue_sync_delay(),
            reconnect_debounce: config.reconnect_debounce(),
        })
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            enqueue_sync_delay: Duration::from_millis(100),
            reconnect_debounce: Duration::from_secs(1),
        }
    }
}

pub struct OfflineQueueService {
    store: Arc<dyn QueueStore>,
    key_store: Arc<dyn DeviceKeyStore>,
    cipher: Arc<dyn PayloadCipher>,
    sink: Arc<dyn RemoteSink>,
    connectivity: Arc<dyn ConnectivitySignal>,
    clock: Arc<dyn Clock>,
    settings: QueueSettings,
    gate: Mutex<()>,
    schedule: StdMutex<RetrySchedule>,
    tasks: StdMutex<BackgroundTasks>,
    stopped: AtomicBool,
    count_tx: watch::Sender<usize>,
    metrics: QueueMetrics,
    weak_self: Weak<Self>,
}

impl OfflineQueueService {
    pub fn new(
        store: Arc<dyn QueueStore>,
        key_store: Arc<dyn DeviceKeyStore>,
        cipher: Arc<dyn PayloadCipher>,
        sink: Arc<dyn RemoteSink>,
        connectivity: Arc<dyn ConnectivitySignal>,
        settings: QueueSettings,
    ) -> Arc<Self> {
        Self::with_clock(
            store,
            key_store,
            cipher,
            sink,
            connectivity,
            Arc::new(SystemClock),
            settings,
        )
    }

    pub fn with_clock(
        store: Arc<dyn QueueStore>,
        key_store: Arc<dyn DeviceKeyStore>,
        cipher: Arc<dyn PayloadCipher>,
        sink: Arc<dyn RemoteSink>,
        connectivity: Arc<dyn ConnectivitySignal>,
        clock: Arc<dyn Clock>,
        settings: QueueSettings,
    ) -> Arc<Self> {
        let (count_tx, _) = watch::channel(0usize);
        Arc::new_cyclic(|weak_self| Self {
            store,
            key_store,
            cipher,
            sink,
            connectivity,
            clock,
            settings,
            gate: Mutex::new(()),
            schedule: StdMutex::new(RetrySchedule::default()),
            tasks: StdMutex::new(BackgroundTasks::default()),
            stopped: AtomicBool::new(false),
            count_tx,
            metrics: QueueMetrics::new(),
            weak_self: weak_self.clone(),
        })
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }
}

impl Drop for OfflineQueueService {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.get_mut() {
            tasks.abort_all();
        }
    }
}

#[cfg(test)]
mod tests;
