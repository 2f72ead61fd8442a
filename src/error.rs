//! Error types for gitlet
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, missing repo, unknown branch or commit)
//! - 3: Precondition failed (nothing staged, untracked file in the way, ...)
//! - 4: Operation failed (io error, corrupt object, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the gitlet CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const PRECONDITION_FAILED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for gitlet operations
#[derive(Error, Debug)]
pub enum Error {
    // Usage errors (exit code 2)
    #[error("Incorrect operands: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Repository state errors (exit code 2)
    #[error("Not in an initialized Gitlet directory: {0}")]
    NotInitialized(PathBuf),

    #[error("A Gitlet version-control system already exists in {0}")]
    AlreadyInitialized(PathBuf),

    // Reference not found (exit code 2)
    #[error("No such branch exists: {0}")]
    BranchNotFound(String),

    #[error("No commit with that id exists: {0}")]
    CommitNotFound(String),

    #[error("Commit id prefix '{prefix}' is ambiguous ({matches} matches)")]
    AmbiguousCommit { prefix: String, matches: usize },

    #[error("File does not exist in that commit: {0}")]
    FileNotInCommit(String),

    #[error("File does not exist: {0}")]
    FileNotFound(String),

    #[error("Found no commit with that message: {0}")]
    NoCommitWithMessage(String),

    #[error("A remote with that name does not exist: {0}")]
    RemoteNotFound(String),

    #[error("Remote directory not found: {0}")]
    RemoteDirectoryNotFound(PathBuf),

    #[error("That remote does not have that branch: {0}")]
    RemoteBranchNotFound(String),

    // Precondition failures (exit code 3)
    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("No reason to remove the file: {0}")]
    NoReasonToRemove(String),

    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("There is an untracked file in the way; delete it, or add and commit it first: {0}")]
    UntrackedFileInTheWay(String),

    #[error("No need to check out the current branch: {0}")]
    AlreadyOnBranch(String),

    #[error("Cannot remove the current branch: {0}")]
    CannotRemoveCurrentBranch(String),

    #[error("A branch with that name already exists: {0}")]
    BranchExists(String),

    #[error("Branch name {name} clashes with existing branch {existing}")]
    BranchNameConflict { name: String, existing: String },

    #[error("A remote with that name already exists: {0}")]
    RemoteExists(String),

    #[error("Please pull down remote changes before pushing to {remote}/{branch}.")]
    PushRejected { remote: String, branch: String },

    #[error("Commit id {0} already names a different commit; retry in a moment")]
    CommitIdCollision(String),

    // Operation failures (exit code 4)
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

    #[error("Corrupt object {id}: {reason}")]
    CorruptObject { id: String, reason: String },

    #[error("Commits {left} and {right} share no history")]
    NoCommonAncestor { left: String, right: String },
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::NotInitialized(_)
            | Error::AlreadyInitialized(_)
            | Error::BranchNotFound(_)
            | Error::CommitNotFound(_)
            | Error::AmbiguousCommit { .. }
            | Error::FileNotInCommit(_)
            | Error::FileNotFound(_)
            | Error::NoCommitWithMessage(_)
            | Error::RemoteNotFound(_)
            | Error::RemoteDirectoryNotFound(_)
            | Error::RemoteBranchNotFound(_) => exit_codes::USER_ERROR,

            // Precondition failures
            Error::EmptyMessage
            | Error::NothingToCommit
            | Error::NoReasonToRemove(_)
            | Error::MergeWithSelf
            | Error::UncommittedChanges
            | Error::UntrackedFileInTheWay(_)
            | Error::AlreadyOnBranch(_)
            | Error::CannotRemoveCurrentBranch(_)
            | Error::BranchExists(_)
            | Error::BranchNameConflict { .. }
            | Error::RemoteExists(_)
            | Error::PushRejected { .. }
            | Error::CommitIdCollision(_) => exit_codes::PRECONDITION_FAILED,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::CorruptObject { .. }
            | Error::NoCommonAncestor { .. } => exit_codes::OPERATION_FAILED,
        }
    }

    /// Taxonomy label for machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) | Error::InvalidConfig(_) => "usage_error",
            Error::NotInitialized(_) | Error::AlreadyInitialized(_) => "repository_state_error",
            Error::BranchNotFound(_)
            | Error::CommitNotFound(_)
            | Error::AmbiguousCommit { .. }
            | Error::FileNotInCommit(_)
            | Error::FileNotFound(_)
            | Error::NoCommitWithMessage(_)
            | Error::RemoteNotFound(_)
            | Error::RemoteDirectoryNotFound(_)
            | Error::RemoteBranchNotFound(_) => "reference_not_found",
            _ if self.exit_code() == exit_codes::PRECONDITION_FAILED => "precondition_failed",
            _ => "operation_failed",
        }
    }

    /// Structured fields for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::AmbiguousCommit { prefix, matches } => Some(serde_json::json!({
                "prefix": prefix,
                "matches": matches,
            })),
            Error::PushRejected { remote, branch } => Some(serde_json::json!({
                "remote": remote,
                "branch": branch,
            })),
            Error::CorruptObject { id, reason } => Some(serde_json::json!({
                "id": id,
                "reason": reason,
            })),
            Error::BranchNameConflict { name, existing } => Some(serde_json::json!({
                "name": name,
                "existing": existing,
            })),
            Error::UntrackedFileInTheWay(path) => Some(serde_json::json!({ "path": path })),
            Error::InvalidConfig(message) => Some(serde_json::json!({ "message": message })),
            _ => None,
        }
    }
}

/// Result type alias for gitlet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
