use crate::domain::value_objects::{EncryptedPayload, QueueActionType, QueueEntryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RETRIES_EXCEEDED: &str = "Max retries exceeded";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub action_type: QueueActionType,
    pub payload_ciphertext: EncryptedPayload,
    pub created_at: DateTime<Utc>,
    pub attempt_count: u32,
    pub last_error: Option<String>,
}

impl QueueEntry {
    /// Fresh entry with a generated id and no attempts.
    pub fn new(
        action_type: QueueActionType,
        payload_ciphertext: EncryptedPayload,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = QueueEntryId::generate(&action_type, created_at);
        Self {
            id,
            action_type,
            payload_ciphertext,
            created_at,
            attempt_count: 0,
            last_error: None,
        }
    }

    pub fn is_exhausted(&self, max_retries: u32) -> bool {
        self.attempt_count >= max_retries
    }

    pub fn record_failure(&mut self, diagnostic: impl Into<String>) {
        self.attempt_count = self.attempt_count.saturating_add(1);
        self.last_error = Some(diagnostic.into());
    }

    /// Returns false when the entry already carries the exhaustion marker.
    pub fn mark_exhausted(&mut self) -> bool {
        if self.last_error.as_deref() == Some(MAX_RETRIES_EXCEEDED) {
            return false;
        }
        self.last_error = Some(MAX_RETRIES_EXCEEDED.to_string());
        true
    }
}
