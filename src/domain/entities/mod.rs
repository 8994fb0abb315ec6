pub mod offline;

pub use offline::{
    AttendanceMethod, AttendancePayload, CheckInPayload, MAX_RETRIES_EXCEEDED, QueueEntry,
    QueuedAction, SavedProgramPayload, SkipReason, SubmitOutcome, SyncOutcome, SyncReport,
};
