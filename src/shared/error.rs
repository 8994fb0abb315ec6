use std::fmt;

#[derive(Debug)]
pub enum AppError {
    StorageUnavailable(String),
    KeyStore(String),
    Encryption(String),
    Decryption(String),
    Delivery(String),
    UnknownActionType(String),
    DuplicateId(String),
    NotFound(String),
    InvalidInput(String),
    ConfigurationError(String),
    SerializationError(String),
    Internal(String),
}

impl AppError {
    /// Short, log-safe description recorded as an entry's `last_error`.
    pub fn diagnostic(&self) -> String {
        const MAX_DIAGNOSTIC_CHARS: usize = 200;

        let message = self.to_string();
        if message.chars().count() <= MAX_DIAGNOSTIC_CHARS {
            return message;
        }
        let mut truncated: String = message.chars().take(MAX_DIAGNOSTIC_CHARS - 3).collect();
        truncated.push_str("...");
        truncated
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            AppError::KeyStore(msg) => write!(f, "Key store error: {}", msg),
            AppError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            AppError::Decryption(msg) => write!(f, "Decryption failed: {}", msg),
            AppError::Delivery(msg) => write!(f, "Delivery failed: {}", msg),
            AppError::UnknownActionType(msg) => write!(f, "Unknown action type: {}", msg),
            AppError::DuplicateId(msg) => write!(f, "Duplicate queue entry id: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Delivery(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
