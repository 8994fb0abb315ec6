use super::{OfflineQueueService, QueueSettings, SkipReason, SubmitOutcome, SyncOutcome};
use crate::application::ports::{DeviceKeyStore, QueueStore, RemoteSink};
use crate::domain::entities::{
    MAX_RETRIES_EXCEEDED, QueueEntry, QueuedAction, SavedProgramPayload,
};
use crate::domain::value_objects::{
    DeviceKey, EncryptedPayload, QueueActionType, QueuePayload, RetryPolicy,
};
use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::crypto::AesGcmPayloadCipher;
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::network::WatchConnectivity;
use crate::infrastructure::offline::SqliteQueueStore;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<(QueueActionType, QueuePayload)>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingSink {
    fn fail_type(&self, action_type: QueueActionType) {
        self.failing
            .lock()
            .unwrap()
            .insert(action_type.as_str().to_string());
    }

    fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn calls(&self) -> Vec<(QueueActionType, QueuePayload)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, action_type: QueueActionType, payload: &QueuePayload) -> Result<(), AppError> {
        self.calls
            .lock()
            .unwrap()
            .push((action_type.clone(), payload.clone()));
        if self.failing.lock().unwrap().contains(action_type.as_str()) {
            return Err(AppError::Delivery("remote returned 503".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSink for RecordingSink {
    async fn upsert_check_in(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::CheckIn, payload)
    }

    async fn insert_attendance(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::Attendance, payload)
    }

    async fn insert_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::SaveProgram, payload)
    }

    async fn delete_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError> {
        self.record(QueueActionType::UnsaveProgram, payload)
    }
}

/// Holds every delivery until released.
struct BlockingSink {
    entered: Notify,
    release: Notify,
    deliveries: AtomicUsize,
}

impl BlockingSink {
    fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Notify::new(),
            deliveries: AtomicUsize::new(0),
        }
    }

    async fn block(&self) -> Result<(), AppError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.deliveries.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RemoteSink for BlockingSink {
    async fn upsert_check_in(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        self.block().await
    }

    async fn insert_attendance(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        self.block().await
    }

    async fn insert_saved_program(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        self.block().await
    }

    async fn delete_saved_program(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        self.block().await
    }
}

/// Rejects check-ins and holds saved-program writes until released.
struct GatedSink {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl RemoteSink for GatedSink {
    async fn upsert_check_in(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        Err(AppError::Delivery("rpc returned 502".to_string()))
    }

    async fn insert_attendance(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_saved_program(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }

    async fn delete_saved_program(&self, _payload: &QueuePayload) -> Result<(), AppError> {
        Ok(())
    }
}

struct MemoryKeyStore {
    key: Mutex<Option<DeviceKey>>,
    unavailable: AtomicBool,
}

impl MemoryKeyStore {
    fn new() -> Self {
        Self {
            key: Mutex::new(None),
            unavailable: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DeviceKeyStore for MemoryKeyStore {
    async fn get_or_create_key(&self) -> Result<DeviceKey, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::KeyStore("keychain locked".to_string()));
        }
        let mut key = self.key.lock().unwrap();
        Ok(key.get_or_insert_with(DeviceKey::generate).clone())
    }

    async fn clear_key(&self) -> Result<(), AppError> {
        *self.key.lock().unwrap() = None;
        Ok(())
    }
}

struct Harness {
    service: Arc<OfflineQueueService>,
    store: Arc<SqliteQueueStore>,
    keys: Arc<MemoryKeyStore>,
    connectivity: Arc<WatchConnectivity>,
    clock: Arc<ManualClock>,
}

fn quiet_settings() -> QueueSettings {
    // long real-time delays keep background triggers out of the way
    let delays = [60, 120, 300, 600, 1_800]
        .into_iter()
        .map(Duration::from_secs)
        .collect();
    QueueSettings {
        retry: RetryPolicy::new(5, delays).unwrap(),
        enqueue_sync_delay: Duration::from_secs(600),
        reconnect_debounce: Duration::from_secs(600),
    }
}

async fn harness_with(sink: Arc<dyn RemoteSink>, online: bool) -> Harness {
    harness_with_settings(sink, online, quiet_settings()).await
}

async fn harness_with_settings(
    sink: Arc<dyn RemoteSink>,
    online: bool,
    settings: QueueSettings,
) -> Harness {
    let pool = ConnectionPool::from_memory().await.unwrap();
    pool.migrate().await.unwrap();
    let store = Arc::new(SqliteQueueStore::new(pool));
    let keys = Arc::new(MemoryKeyStore::new());
    let connectivity = Arc::new(WatchConnectivity::new(online));
    let clock = Arc::new(ManualClock::new());

    let service = OfflineQueueService::with_clock(
        store.clone(),
        keys.clone(),
        Arc::new(AesGcmPayloadCipher::new()),
        sink,
        connectivity.clone(),
        clock.clone(),
        settings,
    );

    Harness {
        service,
        store,
        keys,
        connectivity,
        clock,
    }
}

fn check_in_payload() -> QueuePayload {
    QueuePayload::new(json!({
        "timestamp": "2025-03-01T09:30:00Z",
        "dimension": "mood",
        "mood_level_1_6": 5,
        "affect_tags": ["energised"],
        "note": "good session",
        "local_tz": "Australia/Brisbane"
    }))
    .unwrap()
}

fn saved_program(user_id: &str, program_id: &str) -> SavedProgramPayload {
    SavedProgramPayload {
        user_id: user_id.to_string(),
        program_id: program_id.to_string(),
    }
}

fn report(outcome: SyncOutcome) -> super::SyncReport {
    match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("expected a completed pass, got {other:?}"),
    }
}

#[tokio::test]
async fn test_enqueue_persists_ciphertext_only() {
    let sink = Arc::new(RecordingSink::default());
    let h = harness_with(sink, false).await;

    let id = h
        .service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();

    let stored = h.store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.attempt_count, 0);
    assert!(stored.last_error.is_none());
    assert!(!stored.payload_ciphertext.as_str().contains("good session"));
    assert_eq!(h.service.count().await.unwrap(), 1);
    assert_eq!(*h.service.subscribe().borrow(), 1);
}

#[tokio::test]
async fn test_enqueue_rejects_unknown_type() {
    let h = harness_with(Arc::new(RecordingSink::default()), true).await;
    let result = h
        .service
        .enqueue(QueueActionType::from("report_incident"), check_in_payload())
        .await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert_eq!(h.service.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_enqueue_surfaces_key_store_failure() {
    let h = harness_with(Arc::new(RecordingSink::default()), false).await;
    h.keys.unavailable.store(true, Ordering::SeqCst);

    let result = h
        .service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await;
    assert!(matches!(result, Err(AppError::KeyStore(_))));
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_sync_skips_while_offline() {
    let sink = Arc::new(RecordingSink::default());
    let h = harness_with(sink.clone(), false).await;
    h.service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();

    assert_eq!(
        h.service.sync().await,
        SyncOutcome::Skipped(SkipReason::Offline)
    );
    assert!(sink.calls().is_empty());
    assert_eq!(h.service.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_sync_delivers_each_action_to_its_operation_once() {
    let sink = Arc::new(RecordingSink::default());
    let h = harness_with(sink.clone(), false).await;

    h.service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    h.service
        .enqueue_action(QueuedAction::SaveProgram(saved_program("u-1", "p-1")))
        .await
        .unwrap();
    h.service
        .enqueue_action(QueuedAction::UnsaveProgram(saved_program("u-1", "p-2")))
        .await
        .unwrap();

    h.connectivity.set_online(true);
    let first = report(h.service.sync().await);
    assert_eq!(first.delivered, 3);
    assert_eq!(first.failed, 0);
    assert!(!first.is_aborted());

    let calls = sink.calls();
    let types: Vec<_> = calls.iter().map(|(kind, _)| kind.clone()).collect();
    assert_eq!(
        types,
        vec![
            QueueActionType::CheckIn,
            QueueActionType::SaveProgram,
            QueueActionType::UnsaveProgram
        ]
    );
    assert_eq!(calls[0].1, check_in_payload());
    assert_eq!(calls[2].1.str_field("program_id"), Some("p-2"));

    assert_eq!(h.service.count().await.unwrap(), 0);
    assert_eq!(*h.service.subscribe().borrow(), 0);

    let again = report(h.service.sync().await);
    assert_eq!(again.delivered, 0);
    assert_eq!(sink.calls().len(), 3);
    assert_eq!(h.service.metrics().total_success, 3);
}

#[tokio::test]
async fn test_failed_entry_waits_for_its_backoff() {
    let sink = Arc::new(RecordingSink::default());
    sink.fail_type(QueueActionType::Attendance);
    let h = harness_with(sink.clone(), true).await;

    let id = h
        .service
        .enqueue(
            QueueActionType::Attendance,
            QueuePayload::new(json!({ "xid_id": "xid-1", "program_id": "p-1" })).unwrap(),
        )
        .await
        .unwrap();

    let first = report(h.service.sync().await);
    assert_eq!(first.failed, 1);
    let stored = h.store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.attempt_count, 1);
    assert!(stored.last_error.as_deref().unwrap().contains("503"));
    assert!(h.service.has_retry_timer());

    // inside the first backoff window: untouched
    h.clock.advance(Duration::from_millis(59_999));
    let second = report(h.service.sync().await);
    assert_eq!(second.deferred, 1);
    assert_eq!(sink.calls().len(), 1);
    assert_eq!(h.store.get(&id).await.unwrap().unwrap().attempt_count, 1);

    sink.heal();
    h.clock.advance(Duration::from_millis(1));
    let third = report(h.service.sync().await);
    assert_eq!(third.delivered, 1);
    assert_eq!(sink.calls().len(), 2);
    assert_eq!(h.service.count().await.unwrap(), 0);
    assert!(!h.service.has_retry_timer());
}

#[tokio::test]
async fn test_backoff_grows_with_attempts() {
    let sink = Arc::new(RecordingSink::default());
    sink.fail_type(QueueActionType::CheckIn);
    let h = harness_with(sink.clone(), true).await;
    h.service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();

    report(h.service.sync().await);
    h.clock.advance(Duration::from_secs(60));
    report(h.service.sync().await);

    // the second failure waits two minutes, not one
    h.clock.advance(Duration::from_secs(60));
    assert_eq!(report(h.service.sync().await).deferred, 1);
    h.clock.advance(Duration::from_secs(60));
    assert_eq!(report(h.service.sync().await).failed, 1);

    let metrics = h.service.metrics();
    assert_eq!(metrics.total_failure, 3);
    assert_eq!(metrics.consecutive_failure, 3);
    assert_eq!(metrics.last_backoff_ms, Some(300_000));
}

#[tokio::test]
async fn test_overdue_retry_timer_is_replaced_on_rearm() {
    let sink = Arc::new(RecordingSink::default());
    sink.fail_type(QueueActionType::CheckIn);
    let h = harness_with(sink.clone(), true).await;
    let id = h
        .service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    assert_eq!(report(h.service.sync().await).failed, 1);
    assert!(h.service.has_retry_timer());

    // the armed timer still sleeps in real time although its deadline has passed
    h.clock.advance(Duration::from_secs(61));
    h.service.rearm_retry_timer();

    tokio::time::timeout(Duration::from_secs(5), async {
        while sink.calls().len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("replacement timer never ran a pass");
    tokio::time::timeout(Duration::from_secs(5), async {
        while h.store.get(&id).await.unwrap().unwrap().attempt_count < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("second failure never recorded");
}

#[tokio::test]
async fn test_timer_skipped_by_running_pass_is_rearmed() {
    let sink = Arc::new(GatedSink {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let settings = QueueSettings {
        retry: RetryPolicy::new(5, vec![Duration::from_millis(200)]).unwrap(),
        ..quiet_settings()
    };
    let h = harness_with_settings(sink.clone(), true, settings).await;

    h.service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    assert_eq!(report(h.service.sync().await).failed, 1);
    assert!(h.service.has_retry_timer());

    h.service
        .enqueue_action(QueuedAction::SaveProgram(saved_program("u-5", "p-1")))
        .await
        .unwrap();
    let service = h.service.clone();
    let running = tokio::spawn(async move { service.sync().await });
    sink.entered.notified().await;

    // the timer fires while the pass holds the gate and its own sync is skipped
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!h.service.has_retry_timer());

    sink.release.notify_one();
    let pass = report(running.await.unwrap());
    assert_eq!(pass.delivered, 1);
    assert_eq!(pass.deferred, 1);
    assert!(h.service.has_retry_timer());
}

#[tokio::test]
async fn test_exhausted_entry_is_kept_and_never_retried() {
    let sink = Arc::new(RecordingSink::default());
    sink.fail_type(QueueActionType::Attendance);
    let h = harness_with(sink.clone(), true).await;
    let id = h
        .service
        .enqueue(
            QueueActionType::Attendance,
            QueuePayload::new(json!({ "xid_id": "xid-9", "program_id": "p-3" })).unwrap(),
        )
        .await
        .unwrap();

    for _ in 0..5 {
        let pass = report(h.service.sync().await);
        assert_eq!(pass.failed, 1);
        h.clock.advance(Duration::from_secs(3_600));
    }
    let stored = h.store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.attempt_count, 5);
    assert!(stored.last_error.is_some());
    assert!(!h.service.has_retry_timer());

    let sixth = report(h.service.sync().await);
    assert_eq!(sixth.exhausted, 1);
    assert_eq!(sixth.failed, 0);
    assert_eq!(sink.calls().len(), 5);

    let stored = h.store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.attempt_count, 5);
    assert_eq!(stored.last_error.as_deref(), Some(MAX_RETRIES_EXCEEDED));
    assert_eq!(h.service.count().await.unwrap(), 1);
    assert_eq!(h.service.metrics().total_exhausted, 1);

    report(h.service.sync().await);
    assert_eq!(h.service.metrics().total_exhausted, 1);
}

#[tokio::test]
async fn test_sink_failure_does_not_block_later_entries() {
    let sink = Arc::new(RecordingSink::default());
    sink.fail_type(QueueActionType::CheckIn);
    let h = harness_with(sink.clone(), false).await;

    h.service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    h.service
        .enqueue_action(QueuedAction::SaveProgram(saved_program("u-2", "p-7")))
        .await
        .unwrap();

    h.connectivity.set_online(true);
    let pass = report(h.service.sync().await);
    assert_eq!(pass.failed, 1);
    assert_eq!(pass.delivered, 1);
    assert_eq!(h.service.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_corrupt_and_unknown_entries_count_as_failures() {
    let sink = Arc::new(RecordingSink::default());
    let h = harness_with(sink.clone(), true).await;

    let corrupt = QueueEntry::new(
        QueueActionType::CheckIn,
        EncryptedPayload::new("bm90IGEgcmVhbCBjaXBoZXJ0ZXh0".into()).unwrap(),
        Utc::now(),
    );
    let foreign = QueueEntry::new(
        QueueActionType::Unknown("report_incident".into()),
        EncryptedPayload::new("AAAA".into()).unwrap(),
        Utc::now(),
    );
    h.store.add(&corrupt).await.unwrap();
    h.store.add(&foreign).await.unwrap();

    let pass = report(h.service.sync().await);
    assert_eq!(pass.failed, 2);
    assert!(!pass.is_aborted());
    assert!(sink.calls().is_empty());

    let corrupt = h.store.get(&corrupt.id).await.unwrap().unwrap();
    assert!(corrupt.last_error.unwrap().starts_with("Decryption failed"));
    let foreign = h.store.get(&foreign.id).await.unwrap().unwrap();
    assert_eq!(
        foreign.last_error.as_deref(),
        Some("Unknown action type: report_incident")
    );
}

#[tokio::test]
async fn test_key_store_failure_aborts_pass() {
    let sink = Arc::new(RecordingSink::default());
    let h = harness_with(sink.clone(), false).await;
    let id = h
        .service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();

    h.keys.unavailable.store(true, Ordering::SeqCst);
    h.connectivity.set_online(true);
    let pass = report(h.service.sync().await);
    assert!(pass.aborted.unwrap().contains("keychain locked"));
    assert_eq!(h.store.get(&id).await.unwrap().unwrap().attempt_count, 0);
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn test_storage_failure_aborts_pass_and_releases_gate() {
    let h = harness_with(Arc::new(RecordingSink::default()), true).await;
    h.store.pool().close().await;

    let pass = report(h.service.sync().await);
    assert!(pass.aborted.unwrap().starts_with("Storage unavailable"));
    // the gate is free again
    assert!(matches!(h.service.sync().await, SyncOutcome::Completed(_)));
}

#[tokio::test]
async fn test_overlapping_sync_is_skipped() {
    let sink = Arc::new(BlockingSink::new());
    let h = harness_with(sink.clone(), false).await;
    h.service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    h.connectivity.set_online(true);

    let service = h.service.clone();
    let running = tokio::spawn(async move { service.sync().await });
    sink.entered.notified().await;

    assert_eq!(
        h.service.sync().await,
        SyncOutcome::Skipped(SkipReason::AlreadyRunning)
    );

    sink.release.notify_one();
    let first = report(running.await.unwrap());
    assert_eq!(first.delivered, 1);
    assert_eq!(sink.deliveries.load(Ordering::SeqCst), 1);
    assert_eq!(h.service.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_and_discard() {
    let sink = Arc::new(RecordingSink::default());
    sink.fail_type(QueueActionType::SaveProgram);
    let h = harness_with(sink, true).await;

    let failing = h
        .service
        .enqueue_action(QueuedAction::SaveProgram(saved_program("u-3", "p-1")))
        .await
        .unwrap();
    report(h.service.sync().await);
    assert!(h.service.has_retry_timer());

    assert!(h.service.discard(&failing).await.unwrap());
    assert!(!h.service.discard(&failing).await.unwrap());
    assert!(!h.service.has_retry_timer());

    for program in ["p-2", "p-3"] {
        h.service
            .enqueue_action(QueuedAction::SaveProgram(saved_program("u-3", program)))
            .await
            .unwrap();
    }
    let mut counts = h.service.subscribe();
    assert_eq!(*counts.borrow_and_update(), 2);

    assert_eq!(h.service.clear().await.unwrap(), 2);
    assert!(counts.has_changed().unwrap());
    assert_eq!(*counts.borrow_and_update(), 0);
    assert!(h.service.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_purge_device_data_drops_queue_and_key() {
    let h = harness_with(Arc::new(RecordingSink::default()), false).await;
    h.service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    let before = h.keys.get_or_create_key().await.unwrap();

    h.service.purge_device_data().await.unwrap();

    assert_eq!(h.service.count().await.unwrap(), 0);
    assert!(h.keys.key.lock().unwrap().is_none());
    assert_ne!(h.keys.get_or_create_key().await.unwrap(), before);
}

#[tokio::test]
async fn test_submit_or_enqueue_prefers_direct_write() {
    let sink = Arc::new(RecordingSink::default());
    let h = harness_with(sink.clone(), true).await;

    let outcome = h
        .service
        .submit_action(QueuedAction::SaveProgram(saved_program("u-4", "p-1")))
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Delivered);
    assert_eq!(h.service.count().await.unwrap(), 0);

    sink.fail_type(QueueActionType::SaveProgram);
    let outcome = h
        .service
        .submit_action(QueuedAction::SaveProgram(saved_program("u-4", "p-2")))
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Queued(_)));

    h.connectivity.set_online(false);
    let outcome = h
        .service
        .submit_or_enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Queued(_)));
    assert_eq!(h.service.count().await.unwrap(), 2);
    assert_eq!(sink.calls().len(), 2);
}

#[tokio::test]
async fn test_online_enqueue_triggers_background_sync() {
    let sink = Arc::new(RecordingSink::default());
    let pool = ConnectionPool::from_memory().await.unwrap();
    pool.migrate().await.unwrap();
    let service = OfflineQueueService::new(
        Arc::new(SqliteQueueStore::new(pool)),
        Arc::new(MemoryKeyStore::new()),
        Arc::new(AesGcmPayloadCipher::new()),
        sink.clone(),
        Arc::new(WatchConnectivity::new(true)),
        QueueSettings {
            enqueue_sync_delay: Duration::from_millis(10),
            ..QueueSettings::default()
        },
    );

    let mut counts = service.subscribe();
    service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), counts.wait_for(|count| *count == 0))
        .await
        .expect("background sync did not drain the queue")
        .unwrap();
    assert_eq!(sink.calls().len(), 1);
}

#[tokio::test]
async fn test_shutdown_cancels_pending_trigger() {
    let sink = Arc::new(RecordingSink::default());
    let pool = ConnectionPool::from_memory().await.unwrap();
    pool.migrate().await.unwrap();
    let service = OfflineQueueService::new(
        Arc::new(SqliteQueueStore::new(pool)),
        Arc::new(MemoryKeyStore::new()),
        Arc::new(AesGcmPayloadCipher::new()),
        sink.clone(),
        Arc::new(WatchConnectivity::new(true)),
        QueueSettings {
            enqueue_sync_delay: Duration::from_millis(50),
            ..QueueSettings::default()
        },
    );

    service
        .enqueue(QueueActionType::CheckIn, check_in_payload())
        .await
        .unwrap();
    service.shutdown();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(sink.calls().is_empty());
    assert_eq!(service.count().await.unwrap(), 1);
}

#[test]
fn test_settings_from_config() {
    let config = crate::shared::config::QueueConfig {
        max_retries: 3,
        retry_delays_ms: vec![50, 100],
        enqueue_sync_delay_ms: 5,
        reconnect_debounce_ms: 20,
    };
    let settings = QueueSettings::from_config(&config).unwrap();
    assert_eq!(settings.retry.max_retries(), 3);
    assert_eq!(settings.retry.delay_for(9), Duration::from_millis(100));
    assert_eq!(settings.reconnect_debounce, Duration::from_millis(20));

    let broken = crate::shared::config::QueueConfig {
        retry_delays_ms: Vec::new(),
        ..config
    };
    assert!(matches!(
        QueueSettings::from_config(&broken),
        Err(AppError::ConfigurationError(_))
    ));
}
