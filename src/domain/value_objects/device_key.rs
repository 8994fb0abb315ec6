use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use std::fmt;

pub const DEVICE_KEY_LEN: usize = 32;

/// 256-bit symmetric key bound to this device. Never leaves it and never prints.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceKey([u8; DEVICE_KEY_LEN]);

impl DeviceKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; DEVICE_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let bytes: [u8; DEVICE_KEY_LEN] = bytes.try_into().map_err(|_| {
            format!(
                "Device key must be {DEVICE_KEY_LEN} bytes, got {}",
                bytes.len()
            )
        })?;
        Ok(Self(bytes))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, String> {
        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| format!("Device key is not valid base64: {e}"))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; DEVICE_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceKey(<redacted>)")
    }
}
