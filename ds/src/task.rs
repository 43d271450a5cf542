//! Task and status types

use serde::{Deserialize, Serialize};

/// Status of a task within the dot chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Live and not part of the current chain
    #[default]
    Open,
    /// Live and preferred in the current chain
    Dotted,
    /// Crossed out; terminal
    Done,
}

impl TaskStatus {
    /// The bracketed marker written to disk for this status
    pub fn marker(self) -> &'static str {
        match self {
            Self::Open => "[ ]",
            Self::Dotted => "[.]",
            Self::Done => "[x]",
        }
    }

    /// Decode the character found between the brackets of a task line.
    ///
    /// `x`/`X` is done, `.` is dotted, and anything else (including an empty
    /// bracket pair) is open.
    pub fn from_mark(mark: Option<char>) -> Self {
        match mark {
            Some('x' | 'X') => Self::Done,
            Some('.') => Self::Dotted,
            _ => Self::Open,
        }
    }

    /// True for open and dotted tasks
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Dotted => write!(f, "dotted"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "dotted" => Ok(Self::Dotted),
            "done" => Ok(Self::Done),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// A single entry in a task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Trimmed task text
    pub text: String,
    /// Current status
    pub status: TaskStatus,
}

impl Task {
    /// Create a new open task, trimming the text
    pub fn new(text: impl AsRef<str>) -> Self {
        Self::with_status(text, TaskStatus::Open)
    }

    /// Create a task with an explicit status, trimming the text
    pub fn with_status(text: impl AsRef<str>, status: TaskStatus) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            status,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn is_dotted(&self) -> bool {
        self.status == TaskStatus::Dotted
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }
}
