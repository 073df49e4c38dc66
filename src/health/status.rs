//! Health status values.
//!
//! # States
//! - UP: the dependency answered and reports itself healthy
//! - DOWN: the dependency failed, timed out, or reports itself down
//! - UNKNOWN: the state could not be determined
//!
//! # Aggregation
//! ```text
//! any DOWN                 → DOWN
//! no DOWN, any UNKNOWN     → UNKNOWN
//! all UP                   → UP
//! nothing to aggregate     → UNKNOWN
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// Fold component statuses into one overall status.
    pub fn aggregate<I>(statuses: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        let mut seen_any = false;
        let mut unknown = false;
        for status in statuses {
            seen_any = true;
            match status {
                Status::Down => return Status::Down,
                Status::Unknown => unknown = true,
                Status::Up => {}
            }
        }
        if !seen_any || unknown {
            Status::Unknown
        } else {
            Status::Up
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one probe invocation. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: Status,

    /// Cause or extra context, mostly set for DOWN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn up() -> Self {
        Self {
            status: Status::Up,
            detail: None,
        }
    }

    pub fn down(detail: impl Into<String>) -> Self {
        Self {
            status: Status::Down,
            detail: Some(detail.into()),
        }
    }

    pub fn unknown() -> Self {
        Self {
            status: Status::Unknown,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_up(&self) -> bool {
        self.status == Status::Up
    }
}
