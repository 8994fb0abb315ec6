use super::OfflineQueueService;
use crate::application::ports::dispatch;
use crate::domain::entities::{QueueEntry, QueuedAction, SubmitOutcome};
use crate::domain::value_objects::{QueueActionType, QueueEntryId, QueuePayload};
use crate::infrastructure::offline::{
    DeliveryOutcomeMetadata, DeliveryOutcomeStatus, QueueMetricsSnapshot,
};
use crate::shared::error::AppError;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{info, warn};

impl OfflineQueueService {
    /// Encrypts and persists an action, then schedules a sync when online.
    ///
    /// Errors mean nothing was stored and the caller still owns the action.
    pub async fn enqueue(
        &self,
        action_type: QueueActionType,
        payload: QueuePayload,
    ) -> Result<QueueEntryId, AppError> {
        if !action_type.is_known() {
            return Err(AppError::InvalidInput(format!(
                "Cannot queue unsupported action type {action_type}"
            )));
        }

        let key = self.key_store.get_or_create_key().await?;
        let ciphertext = self.cipher.encrypt(&payload, &key)?;
        let entry = QueueEntry::new(action_type, ciphertext, Utc::now());
        self.store.add(&entry).await?;

        info!(
            target: "offline::queue",
            entry_id = %entry.id,
            action_type = %entry.action_type,
            "action queued"
        );
        self.publish_count().await;

        if self.connectivity.is_online() {
            self.spawn_delayed_sync(self.settings.enqueue_sync_delay, "enqueue");
        }
        Ok(entry.id)
    }

    pub async fn enqueue_action(&self, action: QueuedAction) -> Result<QueueEntryId, AppError> {
        let payload = action.to_payload().map_err(AppError::SerializationError)?;
        self.enqueue(action.action_type(), payload).await
    }

    /// Writes straight to the sink when online and falls back to the queue otherwise.
    pub async fn submit_or_enqueue(
        &self,
        action_type: QueueActionType,
        payload: QueuePayload,
    ) -> Result<SubmitOutcome, AppError> {
        if !action_type.is_known() {
            return Err(AppError::InvalidInput(format!(
                "Cannot submit unsupported action type {action_type}"
            )));
        }

        if self.connectivity.is_online() {
            match dispatch(self.sink.as_ref(), &action_type, &payload).await {
                Ok(()) => {
                    self.metrics.record(
                        DeliveryOutcomeStatus::Success,
                        &DeliveryOutcomeMetadata {
                            action_type: Some(action_type.to_string()),
                            ..DeliveryOutcomeMetadata::default()
                        },
                    );
                    return Ok(SubmitOutcome::Delivered);
                }
                Err(err) => {
                    warn!(
                        target: "offline::queue",
                        action_type = %action_type,
                        error = %err,
                        "direct write failed, queueing instead"
                    );
                }
            }
        }

        let id = self.enqueue(action_type, payload).await?;
        Ok(SubmitOutcome::Queued(id))
    }

    pub async fn submit_action(&self, action: QueuedAction) -> Result<SubmitOutcome, AppError> {
        let payload = action.to_payload().map_err(AppError::SerializationError)?;
        self.submit_or_enqueue(action.action_type(), payload).await
    }

    pub async fn count(&self) -> Result<usize, AppError> {
        let count = self.store.count().await?;
        self.count_tx.send_replace(count);
        Ok(count)
    }

    pub async fn entries(&self) -> Result<Vec<QueueEntry>, AppError> {
        self.store.get_all().await
    }

    /// Receiver for the queue size, refreshed on every enqueue, sync, clear and discard.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count_tx.subscribe()
    }

    /// Removes every entry and all backoff state. Waits for a running pass to finish.
    pub async fn clear(&self) -> Result<usize, AppError> {
        let _guard = self.gate.lock().await;
        self.clear_entries().await
    }

    /// Operator removal of a single entry, typically an exhausted one.
    pub async fn discard(&self, id: &QueueEntryId) -> Result<bool, AppError> {
        let guard = self.gate.lock().await;
        let removed = self.store.delete(id).await?;
        if let Ok(mut schedule) = self.schedule.lock() {
            schedule.forget(id);
        }
        drop(guard);
        self.publish_count().await;
        self.rearm_retry_timer();
        if removed {
            info!(target: "offline::queue", entry_id = %id, "entry discarded");
        }
        Ok(removed)
    }

    /// Account deletion: drops the queue together with the key that encrypted it.
    pub async fn purge_device_data(&self) -> Result<(), AppError> {
        let _guard = self.gate.lock().await;
        self.clear_entries().await?;
        self.key_store.clear_key().await?;
        info!(target: "offline::queue", "device queue data purged");
        Ok(())
    }

    pub fn metrics(&self) -> QueueMetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn clear_entries(&self) -> Result<usize, AppError> {
        let removed = self.store.clear().await?;
        if let Ok(mut schedule) = self.schedule.lock() {
            schedule.clear();
        }
        self.cancel_retry_timer();
        self.count_tx.send_replace(0);
        info!(target: "offline::queue", removed, "queue cleared");
        Ok(removed)
    }

    pub(super) async fn publish_count(&self) {
        match self.store.count().await {
            Ok(count) => {
                self.count_tx.send_replace(count);
            }
            Err(err) => {
                warn!(target: "offline::queue", error = %err, "failed to refresh queue count");
            }
        }
    }
}
