use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of write a queued action performs once delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueueActionType {
    CheckIn,
    Attendance,
    SaveProgram,
    UnsaveProgram,
    /// Persisted by a build that knows a type this one does not.
    Unknown(String),
}

impl QueueActionType {
    pub const KNOWN: [QueueActionType; 4] = [
        QueueActionType::CheckIn,
        QueueActionType::Attendance,
        QueueActionType::SaveProgram,
        QueueActionType::UnsaveProgram,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            QueueActionType::CheckIn => "checkin",
            QueueActionType::Attendance => "attendance",
            QueueActionType::SaveProgram => "save_program",
            QueueActionType::UnsaveProgram => "unsave_program",
            QueueActionType::Unknown(value) => value.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, QueueActionType::Unknown(_))
    }
}

impl From<&str> for QueueActionType {
    fn from(value: &str) -> Self {
        match value {
            "checkin" => QueueActionType::CheckIn,
            "attendance" => QueueActionType::Attendance,
            "save_program" => QueueActionType::SaveProgram,
            "unsave_program" => QueueActionType::UnsaveProgram,
            other => QueueActionType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for QueueActionType {
    fn from(value: String) -> Self {
        QueueActionType::from(value.as_str())
    }
}

impl From<QueueActionType> for String {
    fn from(kind: QueueActionType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for QueueActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
