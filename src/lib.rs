//! gitlet - a small local snapshot version-control system
//!
//! Commits are immutable, content-addressed snapshots (path -> blob id)
//! linked to one or two parents. Branches are named pointers to commits and
//! HEAD names the checked-out branch. Changes are staged before they are
//! committed; branches merge with a three-way merge against their common
//! ancestor.
//!
//! # Module Organization
//!
//! - `ids`: Content-derived commit and blob identifiers
//! - `commit`: Commit records and snapshot composition
//! - `stage`: Staging area state machine
//! - `ancestry`: Ancestor distances and merge-base selection
//! - `merge`: Pure three-way snapshot merge and conflict content
//! - `storage`: `.gitlet/` layout, object store and references
//! - `worktree`: Working-tree scanning and file access
//! - `repository`: Command operations over persisted state
//! - `config`: Configuration loading from `.gitlet/config.toml`
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output
//! - `cli`: Command-line interface using clap
//! - `error`: Error types and result aliases

pub mod ancestry;
pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod ids;
pub mod lock;
pub mod merge;
pub mod output;
pub mod repository;
pub mod stage;
pub mod storage;
pub mod worktree;

pub use error::{Error, Result};
pub use repository::Repository;
