use serde::{Deserialize, Serialize};
use std::fmt;

/// Text-safe ciphertext of a [`QueuePayload`](super::QueuePayload): base64 of nonce followed by
/// the AEAD output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload(String);

impl EncryptedPayload {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Encrypted payload cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptedPayload({} chars)", self.0.len())
    }
}

impl From<EncryptedPayload> for String {
    fn from(payload: EncryptedPayload) -> Self {
        payload.0
    }
}
