pub mod queue_entry;
pub mod queued_action;
pub mod sync_report;

pub use queue_entry::{MAX_RETRIES_EXCEEDED, QueueEntry};
pub use queued_action::{
    AttendanceMethod, AttendancePayload, CheckInPayload, QueuedAction, SavedProgramPayload,
};
pub use sync_report::{SkipReason, SubmitOutcome, SyncOutcome, SyncReport};
