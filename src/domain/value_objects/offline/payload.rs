use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plaintext body of a queued action. Contents are opaque to the queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuePayload(Value);

impl QueuePayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// String field lookup used by sinks that need a natural key.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    fn validate(value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Err("Queue payload cannot be null".to_string());
        }
        Ok(())
    }
}

impl From<QueuePayload> for Value {
    fn from(payload: QueuePayload) -> Self {
        payload.0
    }
}
