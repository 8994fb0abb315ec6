use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcomeStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueMetricsSnapshot {
    pub total_success: u64,
    pub total_failure: u64,
    pub total_exhausted: u64,
    pub consecutive_failure: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
    pub last_outcome: Option<DeliveryOutcomeStatus>,
    pub last_entry_id: Option<String>,
    pub last_action_type: Option<String>,
    pub last_attempt_count: Option<u32>,
    pub last_max_retries: Option<u32>,
    pub last_backoff_ms: Option<u64>,
    pub last_error: Option<String>,
}

/// Context recorded alongside a delivery outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryOutcomeMetadata {
    pub entry_id: Option<String>,
    pub action_type: Option<String>,
    pub attempt_count: Option<u32>,
    pub max_retries: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub error: Option<String>,
}

#[derive(Default, Clone)]
struct LastDeliveryMetadata {
    last_outcome: Option<DeliveryOutcomeStatus>,
    entry_id: Option<String>,
    action_type: Option<String>,
    attempt_count: Option<u32>,
    max_retries: Option<u32>,
    backoff_ms: Option<u64>,
    error: Option<String>,
}

/// Delivery counters owned by one queue manager.
pub struct QueueMetrics {
    success: AtomicU64,
    failure: AtomicU64,
    exhausted: AtomicU64,
    consecutive_failure: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
    metadata: Mutex<LastDeliveryMetadata>,
}

impl QueueMetrics {
    pub fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            exhausted: AtomicU64::new(0),
            consecutive_failure: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            metadata: Mutex::new(LastDeliveryMetadata::default()),
        }
    }

    pub fn record(&self, status: DeliveryOutcomeStatus, meta: &DeliveryOutcomeMetadata) {
        match status {
            DeliveryOutcomeStatus::Success => {
                self.success.fetch_add(1, Ordering::Relaxed);
                self.last_success_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failure.store(0, Ordering::Relaxed);
            }
            DeliveryOutcomeStatus::Failure => {
                self.failure.fetch_add(1, Ordering::Relaxed);
                self.last_failure_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failure.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Ok(mut guard) = self.metadata.lock() {
            guard.last_outcome = Some(status);
            guard.entry_id = meta.entry_id.clone();
            guard.action_type = meta.action_type.clone();
            guard.attempt_count = meta.attempt_count;
            guard.max_retries = meta.max_retries;
            guard.backoff_ms = meta.backoff_ms;
            guard.error = meta.error.clone();
        }
    }

    /// Counts an entry newly found at the retry ceiling.
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        let metadata = self
            .metadata
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|_| LastDeliveryMetadata::default());

        QueueMetricsSnapshot {
            total_success: self.success.load(Ordering::Relaxed),
            total_failure: self.failure.load(Ordering::Relaxed),
            total_exhausted: self.exhausted.load(Ordering::Relaxed),
            consecutive_failure: self.consecutive_failure.load(Ordering::Relaxed),
            last_success_ms: to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: to_option(self.last_failure_ms.load(Ordering::Relaxed)),
            last_outcome: metadata.last_outcome,
            last_entry_id: metadata.entry_id,
            last_action_type: metadata.action_type,
            last_attempt_count: metadata.attempt_count,
            last_max_retries: metadata.max_retries,
            last_backoff_ms: metadata.backoff_ms,
            last_error: metadata.error,
        }
    }
}

impl Default for QueueMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 { None } else { Some(value) }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
