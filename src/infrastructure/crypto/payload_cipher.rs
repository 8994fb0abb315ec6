use crate::application::ports::PayloadCipher;
use crate::domain::value_objects::{DeviceKey, EncryptedPayload, QueuePayload};
use crate::shared::error::AppError;
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose};
use thiserror::Error;

const NONCE_SIZE: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Payload serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Encryption failed: {0}")]
    Seal(String),
    #[error("Base64 decode failed: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("Encrypted data is shorter than nonce size")]
    Truncated,
    #[error("Authentication failed")]
    Authentication,
    #[error("Decrypted payload is not valid JSON: {0}")]
    Plaintext(#[source] serde_json::Error),
}

impl From<CipherError> for AppError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Serialize(_) | CipherError::Seal(_) => {
                AppError::Encryption(err.to_string())
            }
            _ => AppError::Decryption(err.to_string()),
        }
    }
}

/// AES-256-GCM over the canonical JSON encoding of a payload.
/// Output is `base64(nonce || ciphertext || tag)` with a fresh random nonce per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmPayloadCipher;

impl AesGcmPayloadCipher {
    pub fn new() -> Self {
        Self
    }

    fn cipher(key: &DeviceKey) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
    }

    fn seal(payload: &QueuePayload, key: &DeviceKey) -> Result<String, CipherError> {
        let plaintext = serde_json::to_vec(payload.as_json()).map_err(CipherError::Serialize)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = Self::cipher(key)
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|err| CipherError::Seal(err.to_string()))?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(combined))
    }

    fn open(encoded: &str, key: &DeviceKey) -> Result<serde_json::Value, CipherError> {
        let combined = general_purpose::STANDARD.decode(encoded)?;
        if combined.len() < NONCE_SIZE {
            return Err(CipherError::Truncated);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = Self::cipher(key)
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::Authentication)?;

        serde_json::from_slice(&plaintext).map_err(CipherError::Plaintext)
    }
}

impl PayloadCipher for AesGcmPayloadCipher {
    fn encrypt(
        &self,
        payload: &QueuePayload,
        key: &DeviceKey,
    ) -> Result<EncryptedPayload, AppError> {
        let encoded = Self::seal(payload, key)?;
        EncryptedPayload::new(encoded).map_err(AppError::Encryption)
    }

    fn decrypt(
        &self,
        ciphertext: &EncryptedPayload,
        key: &DeviceKey,
    ) -> Result<QueuePayload, AppError> {
        let value = Self::open(ciphertext.as_str(), key)?;
        QueuePayload::new(value).map_err(AppError::Decryption)
    }
}
