//! Work items, per-item results and batch aggregation
//!
//! Every id handed to the coordinator ends as exactly one [`ResultRecord`].
//! Records are immutable once built; [`BatchSummary`] is derived from a
//! slice of them and never updated incrementally.

mod kind;
mod summary;

pub use kind::{ErrorKind, UnknownKind};
pub use summary::BatchSummary;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of work: a remote document id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
}

impl WorkItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<&str> for WorkItem {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WorkItem {
    fn from(id: String) -> Self {
        Self { id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub status: Status,
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl ResultRecord {
    /// Status is derived from the kind so the two can never disagree.
    pub fn new(id: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        let status = if kind.is_success() {
            Status::Success
        } else {
            Status::Failed
        };

        Self {
            id: id.into(),
            status,
            kind,
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status, self.id, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_kind() {
        assert_eq!(ResultRecord::new("1", ErrorKind::Success, "ok").status, Status::Success);
        assert_eq!(
            ResultRecord::new("2", ErrorKind::AlreadyExists, "exists").status,
            Status::Success
        );
        assert_eq!(
            ResultRecord::new("3", ErrorKind::NotFound, "File not found").status,
            Status::Failed
        );
    }

    #[test]
    fn test_display_line() {
        let record = ResultRecord::new("456", ErrorKind::NotFound, "File not found");
        assert_eq!(record.to_string(), "FAILED 456: File not found");
    }
}
