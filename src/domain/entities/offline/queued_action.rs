use crate::domain::value_objects::{QueueActionType, QueuePayload};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceMethod {
    Qr,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInPayload {
    pub timestamp: String,
    pub dimension: String,
    pub mood_level_1_6: u8,
    #[serde(default)]
    pub affect_tags: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub local_tz: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendancePayload {
    pub xid_id: String,
    pub program_id: String,
    pub timestamp: String,
    pub method: AttendanceMethod,
    #[serde(default)]
    pub site: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgramPayload {
    pub user_id: String,
    pub program_id: String,
}

/// Typed front door for the four queueable writes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueuedAction {
    CheckIn(CheckInPayload),
    Attendance(AttendancePayload),
    SaveProgram(SavedProgramPayload),
    UnsaveProgram(SavedProgramPayload),
}

impl QueuedAction {
    pub fn action_type(&self) -> QueueActionType {
        match self {
            QueuedAction::CheckIn(_) => QueueActionType::CheckIn,
            QueuedAction::Attendance(_) => QueueActionType::Attendance,
            QueuedAction::SaveProgram(_) => QueueActionType::SaveProgram,
            QueuedAction::UnsaveProgram(_) => QueueActionType::UnsaveProgram,
        }
    }

    pub fn to_payload(&self) -> Result<QueuePayload, String> {
        let value = match self {
            QueuedAction::CheckIn(payload) => serde_json::to_value(payload),
            QueuedAction::Attendance(payload) => serde_json::to_value(payload),
            QueuedAction::SaveProgram(payload) | QueuedAction::UnsaveProgram(payload) => {
                serde_json::to_value(payload)
            }
        }
        .map_err(|e| format!("Failed to serialize {} payload: {e}", self.action_type()))?;
        QueuePayload::new(value)
    }
}
