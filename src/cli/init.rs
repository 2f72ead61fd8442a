//! gitlet init command implementation
//!
//! Creates `.gitlet/` with the root commit, the `master` branch and a
//! default config.

use std::path::PathBuf;

use serde::Serialize;

use super::CommonOptions;
use crate::error::Result;
use crate::ids::CommitId;
use crate::output::{emit_success, HumanOutput};
use crate::repository::Repository;

#[derive(Debug, Serialize)]
struct InitReport {
    repo: PathBuf,
    branch: String,
    commit: CommitId,
}

pub fn run(common: &CommonOptions) -> Result<()> {
    let root = common.work_root()?;
    let repository = Repository::init(&root)?;
    let state = repository.load_state()?;

    let report = InitReport {
        repo: root,
        branch: state.branch,
        commit: state.head.id,
    };

    let mut human = HumanOutput::new("gitlet init: initialized repository");
    human.push_summary("repo", report.repo.display().to_string());
    human.push_summary("branch", report.branch.clone());
    human.push_summary("commit", report.commit.short());
    human.push_next_step("gitlet add <file>");

    emit_success(common.output(), "init", &report, Some(&human))
}
