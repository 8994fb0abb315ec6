pub mod clock;
pub mod crypto;
pub mod database;
pub mod network;
pub mod offline;
pub mod remote;
pub mod storage;

pub use clock::{ManualClock, SystemClock};
pub use crypto::AesGcmPayloadCipher;
pub use database::ConnectionPool;
pub use network::WatchConnectivity;
pub use offline::{QueueMetrics, QueueMetricsSnapshot, SqliteQueueStore};
pub use remote::PostgrestRemoteSink;
pub use storage::{FileSecureStorage, KeyringSecureStorage, SecureDeviceKeyStore, SecureStorage};
