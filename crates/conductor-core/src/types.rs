use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle of a track, task or subtask.
///
/// Transitions are not validated: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub fn all() -> &'static [Status] {
        &[Status::Pending, Status::InProgress, Status::Completed]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }

    /// The character written between the brackets of a `[ ]` marker.
    pub fn marker(self) -> char {
        match self {
            Status::Pending => ' ',
            Status::InProgress => '~',
            Status::Completed => 'x',
        }
    }

    pub fn from_marker(c: char) -> Option<Status> {
        match c {
            ' ' => Some(Status::Pending),
            '~' => Some(Status::InProgress),
            'x' => Some(Status::Completed),
            _ => None,
        }
    }

    pub fn is_completed(self) -> bool {
        self == Status::Completed
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = crate::error::ConductorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "in_progress" | "in-progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            _ => Err(crate::error::ConductorError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
