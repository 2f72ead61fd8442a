//! gitlet commit command implementation

use serde::Serialize;

use super::CommonOptions;
use crate::error::Result;
use crate::ids::CommitId;
use crate::output::{emit_success, HumanOutput};

#[derive(Debug, Serialize)]
struct CommitReport {
    branch: String,
    commit: CommitId,
    parent: Option<CommitId>,
    message: String,
    timestamp: String,
    files: usize,
}

pub fn run(common: &CommonOptions, message: &str) -> Result<()> {
    let repository = common.open()?;
    let commit = repository.commit(message)?;
    let branch = repository.current_branch()?;

    let report = CommitReport {
        branch,
        files: commit.tracked.len(),
        commit: commit.id,
        parent: commit.parent,
        message: commit.message,
        timestamp: commit.timestamp,
    };

    let mut human = HumanOutput::new(format!(
        "gitlet commit: [{} {}] {}",
        report.branch,
        report.commit.short(),
        report.message
    ));
    human.push_summary("tracked files", report.files.to_string());

    emit_success(common.output(), "commit", &report, Some(&human))
}
