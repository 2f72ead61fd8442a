//! gitlet log / global-log / find

use serde::Serialize;

use super::CommonOptions;
use crate::commit::Commit;
use crate::error::Result;
use crate::ids::CommitId;
use crate::output::emit_text;

#[derive(Debug, Serialize)]
struct LogEntry {
    id: CommitId,
    message: String,
    timestamp: String,
    parents: Vec<CommitId>,
}

impl From<Commit> for LogEntry {
    fn from(commit: Commit) -> Self {
        Self {
            parents: commit.parents().cloned().collect(),
            id: commit.id,
            message: commit.message,
            timestamp: commit.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
struct FindReport {
    message: String,
    commits: Vec<CommitId>,
}

/// One log block, blank line included.
pub fn format_log_entry(commit: &Commit) -> String {
    let mut block = format!("===\ncommit {}\n", commit.id);
    if let (Some(first), Some(second)) = (&commit.parent, &commit.parent2) {
        block.push_str(&format!("Merge: {} {}\n", first.short(), second.short()));
    }
    block.push_str(&format!("Date: {}\n{}\n\n", commit.timestamp, commit.message));
    block
}

fn emit_log(common: &CommonOptions, command: &str, commits: Vec<Commit>) -> Result<()> {
    let text: String = commits.iter().map(format_log_entry).collect();
    let entries: Vec<LogEntry> = commits.into_iter().map(LogEntry::from).collect();
    emit_text(common.output(), command, &entries, &text)
}

pub fn run_log(common: &CommonOptions) -> Result<()> {
    let repository = common.open()?;
    emit_log(common, "log", repository.log()?)
}

pub fn run_global_log(common: &CommonOptions) -> Result<()> {
    let repository = common.open()?;
    emit_log(common, "global-log", repository.global_log()?)
}

pub fn run_find(common: &CommonOptions, message: &str) -> Result<()> {
    let repository = common.open()?;
    let commits = repository.find(message)?;
    let text: String = commits.iter().map(|id| format!("{id}\n")).collect();
    let report = FindReport {
        message: message.to_string(),
        commits,
    };
    emit_text(common.output(), "find", &report, &text)
}
