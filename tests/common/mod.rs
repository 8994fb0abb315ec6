#![allow(dead_code)]

use async_trait::async_trait;
use room_xi_offline::application::ports::RemoteSink;
use room_xi_offline::domain::value_objects::{QueueActionType, QueuePayload, RetryPolicy};
use room_xi_offline::infrastructure::database::ConnectionPool;
use room_xi_offline::infrastructure::offline::SqliteQueueStore;
use room_xi_offline::infrastructure::storage::{FileSecureStorage, SecureDeviceKeyStore};
use room_xi_offline::shared::error::AppError;
use room_xi_offline::QueueSettings;
use serde_json::json;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Sink that records every call and optionally rejects all of them.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(QueueActionType, QueuePayload)>>,
    rejecting: AtomicBool,
    latency: Option<Duration>,
}

impl RecordingSink {
    pub fn rejecting() -> Self {
        let sink = Self::default();
        sink.rejecting.store(true, Ordering::SeqCst);
        sink
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(QueueActionType, QueuePayload)> {
        self.calls.lock().expect("calls lock").clone()
    }

    async fn record(
        &self,
        action_type: QueueActionType,
        payload: &QueuePayload,
    ) -> Result<(), AppError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.calls
            .lock()
            .expect("calls lock")
            .push((action_type, payload.clone()));
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(AppError::Delivery("insert attendance returned 500".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSink for RecordingSink {
    async fn upsert_check_in(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::CheckIn, payload).await
    }

    async fn insert_attendance(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::Attendance, payload).await
    }

    async fn insert_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::SaveProgram, payload).await
    }

    async fn delete_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::UnsaveProgram, payload).await
    }
}

pub async fn memory_store() -> Arc<SqliteQueueStore> {
    let pool = ConnectionPool::from_memory().await.expect("memory pool");
    pool.migrate().await.expect("migrate");
    Arc::new(SqliteQueueStore::new(pool))
}

pub async fn file_store(dir: &Path) -> Arc<SqliteQueueStore> {
    let url = format!("sqlite:{}", dir.join("queue.db").display());
    let pool = ConnectionPool::new(&url).await.expect("file pool");
    pool.migrate().await.expect("migrate");
    Arc::new(SqliteQueueStore::new(pool))
}

pub fn file_key_store(dir: &Path) -> Arc<SecureDeviceKeyStore> {
    let storage = Arc::new(FileSecureStorage::new(dir.join("keys")));
    Arc::new(SecureDeviceKeyStore::new(storage, "device-key"))
}

/// Settings whose background triggers never fire during a test.
pub fn manual_settings() -> QueueSettings {
    let delays = [60, 120, 300, 600, 1_800]
        .into_iter()
        .map(Duration::from_secs)
        .collect();
    QueueSettings {
        retry: RetryPolicy::new(5, delays).expect("retry policy"),
        enqueue_sync_delay: Duration::from_secs(600),
        reconnect_debounce: Duration::from_secs(600),
    }
}

pub fn check_in_payload(note: &str) -> QueuePayload {
    QueuePayload::new(json!({
        "timestamp": "2025-03-01T09:30:00Z",
        "dimension": "mood",
        "mood_level_1_6": 4,
        "affect_tags": ["calm", "hopeful"],
        "note": note,
        "local_tz": "Australia/Brisbane"
    }))
    .expect("payload")
}

pub fn attendance_payload(program_id: &str) -> QueuePayload {
    QueuePayload::new(json!({
        "xid_id": "xid-42",
        "program_id": program_id,
        "timestamp": "2025-03-01T17:00:00Z",
        "method": "qr"
    }))
    .expect("payload")
}

pub async fn wait_for_count(rx: &mut watch::Receiver<usize>, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|count| *count == expected))
        .await
        .unwrap_or_else(|_| panic!("queue count never reached {expected}"))
        .expect("count channel closed");
}
