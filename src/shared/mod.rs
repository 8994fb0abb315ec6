pub mod config;
pub mod error;

pub use config::{AppConfig, KeyStoreBackend};
pub use error::{AppError, Result};
