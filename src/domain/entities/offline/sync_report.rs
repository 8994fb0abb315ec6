use crate::domain::value_objects::QueueEntryId;
use serde::{Deserialize, Serialize};

/// Tally of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub delivered: usize,
    pub failed: usize,
    pub exhausted: usize,
    pub deferred: usize,
    /// Set when a storage or key store failure ended the pass early.
    pub aborted: Option<String>,
}

impl SyncReport {
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyRunning,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    Completed(SyncReport),
    Skipped(SkipReason),
}

impl SyncOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Completed(report) => Some(report),
            SyncOutcome::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    Delivered,
    Queued(QueueEntryId),
}
