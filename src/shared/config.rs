use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyStoreBackend {
    Keyring,
    File,
}

impl Default for KeyStoreBackend {
    // keyutils on Linux does not survive a reboot, so the file store is the durable default there
    fn default() -> Self {
        if cfg!(any(target_os = "macos", target_os = "windows")) {
            KeyStoreBackend::Keyring
        } else {
            KeyStoreBackend::File
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub key_store: KeyStoreConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub max_retries: u32,
    pub retry_delays_ms: Vec<u64>,
    pub enqueue_sync_delay_ms: u64,
    pub reconnect_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyStoreConfig {
    pub backend: KeyStoreBackend,
    pub service_name: String,
    pub key_id: String,
    pub key_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default)]
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            database: DatabaseConfig {
                url: format!("sqlite:{}", data_dir.join("offline-queue.db").display()),
                max_connections: 5,
                connection_timeout: 30,
            },
            queue: QueueConfig::default(),
            key_store: KeyStoreConfig {
                backend: KeyStoreBackend::default(),
                service_name: "room-xi".to_string(),
                key_id: "device-key".to_string(),
                key_dir: data_dir.join("keys").display().to_string(),
            },
            remote: RemoteConfig {
                base_url: "http://localhost:54321".to_string(),
                api_key: String::new(),
                access_token: None,
                request_timeout_secs: 15,
            },
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delays_ms: vec![1_000, 2_000, 5_000, 10_000, 30_000],
            enqueue_sync_delay_ms: 100,
            reconnect_debounce_ms: 1_000,
        }
    }
}

impl QueueConfig {
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    pub fn enqueue_sync_delay(&self) -> Duration {
        Duration::from_millis(self.enqueue_sync_delay_ms)
    }

    pub fn reconnect_debounce(&self) -> Duration {
        Duration::from_millis(self.reconnect_debounce_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("ROOM_XI_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Some(value) = lookup("ROOM_XI_DATABASE_MAX_CONNECTIONS").and_then(|v| parse_u32(&v)) {
            cfg.database.max_connections = value;
        }

        if let Some(value) = lookup("ROOM_XI_QUEUE_MAX_RETRIES").and_then(|v| parse_u32(&v)) {
            cfg.queue.max_retries = value;
        }
        if let Some(v) = lookup("ROOM_XI_QUEUE_RETRY_DELAYS_MS") {
            let delays: Vec<u64> = v.split(',').filter_map(parse_u64).collect();
            if !delays.is_empty() {
                cfg.queue.retry_delays_ms = delays;
            }
        }
        if let Some(value) = lookup("ROOM_XI_QUEUE_ENQUEUE_SYNC_DELAY_MS").and_then(|v| parse_u64(&v)) {
            cfg.queue.enqueue_sync_delay_ms = value;
        }
        if let Some(value) = lookup("ROOM_XI_QUEUE_RECONNECT_DEBOUNCE_MS").and_then(|v| parse_u64(&v)) {
            cfg.queue.reconnect_debounce_ms = value;
        }

        if let Some(v) = lookup("ROOM_XI_KEY_BACKEND") {
            cfg.key_store.backend = parse_backend(&v, cfg.key_store.backend);
        }
        if let Some(v) = lookup("ROOM_XI_KEYRING_SERVICE") {
            if !v.trim().is_empty() {
                cfg.key_store.service_name = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("ROOM_XI_KEY_DIR") {
            if !v.trim().is_empty() {
                cfg.key_store.key_dir = v.trim().to_string();
            }
        }

        if let Some(v) = lookup("ROOM_XI_REMOTE_URL") {
            cfg.remote.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("ROOM_XI_REMOTE_API_KEY") {
            cfg.remote.api_key = v.trim().to_string();
        }
        if let Some(v) = lookup("ROOM_XI_REMOTE_ACCESS_TOKEN") {
            let token = v.trim().to_string();
            cfg.remote.access_token = if token.is_empty() { None } else { Some(token) };
        }
        if let Some(value) = lookup("ROOM_XI_REMOTE_TIMEOUT_SECS").and_then(|v| parse_u64(&v)) {
            cfg.remote.request_timeout_secs = value.max(1);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.queue.max_retries == 0 {
            return Err("Queue max_retries must be greater than 0".to_string());
        }
        if self.queue.retry_delays_ms.is_empty() {
            return Err("Queue retry_delays_ms must contain at least one delay".to_string());
        }
        if self.key_store.key_id.trim().is_empty() {
            return Err("Key store key_id cannot be empty".to_string());
        }
        if self.key_store.backend == KeyStoreBackend::Keyring
            && self.key_store.service_name.trim().is_empty()
        {
            return Err("Keyring service_name cannot be empty".to_string());
        }
        if self.remote.request_timeout_secs == 0 {
            return Err("Remote request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("room-xi");
    path
}

fn parse_backend(value: &str, default: KeyStoreBackend) -> KeyStoreBackend {
    match value.trim().to_ascii_lowercase().as_str() {
        "keyring" => KeyStoreBackend::Keyring,
        "file" => KeyStoreBackend::File,
        _ => default,
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
