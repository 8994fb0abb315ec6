use super::OfflineQueueService;
use crate::application::ports::dispatch;
use crate::domain::entities::{QueueEntry, SkipReason, SyncOutcome, SyncReport};
use crate::domain::value_objects::DeviceKey;
use crate::infrastructure::offline::{DeliveryOutcomeMetadata, DeliveryOutcomeStatus};
use crate::shared::error::AppError;
use tracing::{debug, error, info, warn};

enum EntryStep {
    Delivered,
    Failed,
    Exhausted,
    Deferred,
}

impl OfflineQueueService {
    /// Runs one delivery pass over the whole queue.
    ///
    /// Overlapping calls are skipped rather than queued, and nothing runs while offline.
    /// Per-entry failures are recorded on the entry; only storage and key store failures
    /// end the pass early, reported through [`SyncReport::aborted`].
    pub async fn sync(&self) -> SyncOutcome {
        let Ok(guard) = self.gate.try_lock() else {
            debug!(target: "offline::queue", "sync already running, skipping");
            return SyncOutcome::Skipped(SkipReason::AlreadyRunning);
        };
        if !self.connectivity.is_online() {
            debug!(target: "offline::queue", "offline, skipping sync");
            return SyncOutcome::Skipped(SkipReason::Offline);
        }

        let report = self.run_pass().await;
        // a timer that fired during the pass was skipped and has left its slot
        drop(guard);
        self.publish_count().await;
        self.rearm_retry_timer();

        if let Some(reason) = &report.aborted {
            error!(
                target: "offline::queue",
                delivered = report.delivered,
                failed = report.failed,
                error = %reason,
                "sync pass aborted"
            );
        } else {
            info!(
                target: "offline::queue",
                delivered = report.delivered,
                failed = report.failed,
                exhausted = report.exhausted,
                deferred = report.deferred,
                "sync pass completed"
            );
        }
        SyncOutcome::Completed(report)
    }

    async fn run_pass(&self) -> SyncReport {
        let mut report = SyncReport::default();
        let entries = match self.store.get_all().await {
            Ok(entries) => entries,
            Err(err) => {
                report.aborted = Some(err.diagnostic());
                return report;
            }
        };
        if let Ok(mut schedule) = self.schedule.lock() {
            schedule.retain_entries(&entries);
        }

        let mut key: Option<DeviceKey> = None;
        for entry in entries {
            match self.process_entry(entry, &mut key).await {
                Ok(EntryStep::Delivered) => report.delivered += 1,
                Ok(EntryStep::Failed) => report.failed += 1,
                Ok(EntryStep::Exhausted) => report.exhausted += 1,
                Ok(EntryStep::Deferred) => report.deferred += 1,
                Err(err) => {
                    report.aborted = Some(err.diagnostic());
                    break;
                }
            }
        }
        report
    }

    /// `Err` only for failures that make continuing the pass pointless.
    async fn process_entry(
        &self,
        mut entry: QueueEntry,
        key: &mut Option<DeviceKey>,
    ) -> Result<EntryStep, AppError> {
        let max_retries = self.settings.retry.max_retries();

        if entry.is_exhausted(max_retries) {
            if entry.mark_exhausted() {
                self.store.put(&entry).await?;
                self.metrics.record_exhausted();
                warn!(
                    target: "offline::queue",
                    entry_id = %entry.id,
                    action_type = %entry.action_type,
                    attempt = entry.attempt_count,
                    "entry exhausted its retries and is kept for inspection"
                );
            }
            return Ok(EntryStep::Exhausted);
        }

        let deferred = self
            .schedule
            .lock()
            .map(|schedule| schedule.is_deferred(&entry.id, self.clock.now()))
            .unwrap_or(false);
        if deferred {
            return Ok(EntryStep::Deferred);
        }

        let device_key = match key {
            Some(existing) => existing.clone(),
            None => {
                let loaded = self.key_store.get_or_create_key().await?;
                *key = Some(loaded.clone());
                loaded
            }
        };

        match self.deliver(&entry, &device_key).await {
            Ok(()) => {
                self.store.delete(&entry.id).await?;
                if let Ok(mut schedule) = self.schedule.lock() {
                    schedule.forget(&entry.id);
                }
                self.metrics.record(
                    DeliveryOutcomeStatus::Success,
                    &DeliveryOutcomeMetadata {
                        entry_id: Some(entry.id.to_string()),
                        action_type: Some(entry.action_type.to_string()),
                        attempt_count: Some(entry.attempt_count),
                        max_retries: Some(max_retries),
                        ..DeliveryOutcomeMetadata::default()
                    },
                );
                debug!(
                    target: "offline::queue",
                    entry_id = %entry.id,
                    action_type = %entry.action_type,
                    "entry delivered"
                );
                Ok(EntryStep::Delivered)
            }
            Err(err) => {
                let diagnostic = err.diagnostic();
                entry.record_failure(diagnostic.clone());
                self.store.put(&entry).await?;

                let backoff = (!entry.is_exhausted(max_retries))
                    .then(|| self.settings.retry.delay_for(entry.attempt_count));
                if let Ok(mut schedule) = self.schedule.lock() {
                    match backoff {
                        Some(delay) => schedule.defer(entry.id.clone(), self.clock.now() + delay),
                        None => schedule.forget(&entry.id),
                    }
                }

                self.metrics.record(
                    DeliveryOutcomeStatus::Failure,
                    &DeliveryOutcomeMetadata {
                        entry_id: Some(entry.id.to_string()),
                        action_type: Some(entry.action_type.to_string()),
                        attempt_count: Some(entry.attempt_count),
                        max_retries: Some(max_retries),
                        backoff_ms: backoff.map(|delay| delay.as_millis() as u64),
                        error: Some(diagnostic),
                    },
                );
                warn!(
                    target: "offline::queue",
                    entry_id = %entry.id,
                    action_type = %entry.action_type,
                    attempt = entry.attempt_count,
                    error = %err,
                    "delivery failed"
                );
                Ok(EntryStep::Failed)
            }
        }
    }

    async fn deliver(&self, entry: &QueueEntry, key: &DeviceKey) -> Result<(), AppError> {
        if !entry.action_type.is_known() {
            return Err(AppError::UnknownActionType(
                entry.action_type.as_str().to_string(),
            ));
        }
        let payload = self.cipher.decrypt(&entry.payload_ciphertext, key)?;
        dispatch(self.sink.as_ref(), &entry.action_type, &payload).await
    }
}
