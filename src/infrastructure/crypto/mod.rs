pub mod payload_cipher;

pub use payload_cipher::{AesGcmPayloadCipher, CipherError};
