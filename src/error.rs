//! Error types for goaltree
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (unknown goal, bad date, bad args, bad config)
//! - 3: Blocked by the goal tree (sub-goals still incomplete)
//! - 4: Operation failed (I/O, serialization, lock contention)

use std::path::PathBuf;
use thiserror::Error;

use crate::goal::GoalId;

/// Exit codes for the goaltree CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for goaltree operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Goal not found: {0}")]
    NotFound(GoalId),

    #[error("Parent goal not found: {0}")]
    ParentNotFound(GoalId),

    #[error("Invalid date format: '{0}' (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Blocked by tree state (exit code 3)
    #[error("Goal {0} has incomplete sub-goals")]
    IncompleteChildren(GoalId),

    // Operation failures (exit code 4)
    #[error("Invalid goals document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotFound(_)
            | Error::ParentNotFound(_)
            | Error::InvalidDateFormat(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::IncompleteChildren(_) => exit_codes::BLOCKED,

            Error::InvalidDocument(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the error names a goal.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound(id) | Error::IncompleteChildren(id) => {
                Some(serde_json::json!({ "goal_id": id }))
            }
            Error::ParentNotFound(id) => Some(serde_json::json!({ "parent_id": id })),
            Error::InvalidDateFormat(input) => Some(serde_json::json!({ "input": input })),
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for goaltree operations
pub type Result<T> = std::result::Result<T, Error>;

