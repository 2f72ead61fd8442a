//! gitlet branch / rm-branch

use serde::Serialize;

use super::CommonOptions;
use crate::error::Result;
use crate::ids::CommitId;
use crate::output::{emit_success, HumanOutput};

#[derive(Debug, Serialize)]
struct BranchReport {
    name: String,
    commit: CommitId,
}

pub fn run_create(common: &CommonOptions, name: &str) -> Result<()> {
    let repository = common.open()?;
    let commit = repository.create_branch(name)?;
    let report = BranchReport {
        name: name.to_string(),
        commit,
    };

    let mut human = HumanOutput::new(format!(
        "gitlet branch: created {} at {}",
        report.name,
        report.commit.short()
    ));
    human.push_next_step(format!("gitlet checkout {}", report.name));

    emit_success(common.output(), "branch", &report, Some(&human))
}

pub fn run_remove(common: &CommonOptions, name: &str) -> Result<()> {
    let repository = common.open()?;
    let commit = repository.remove_branch(name)?;
    let report = BranchReport {
        name: name.to_string(),
        commit,
    };

    let human = HumanOutput::new(format!(
        "gitlet rm-branch: removed {} (was {})",
        report.name,
        report.commit.short()
    ));

    emit_success(common.output(), "rm-branch", &report, Some(&human))
}
