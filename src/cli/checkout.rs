//! gitlet checkout / reset

use super::CommonOptions;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

pub fn run_branch(common: &CommonOptions, branch: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.checkout_branch(branch)?;

    let mut human = HumanOutput::new(format!("gitlet checkout: switched to {}", report.branch));
    human.push_summary("commit", report.commit.short());
    human.push_summary("written", report.written.len().to_string());
    human.push_summary("deleted", report.deleted.len().to_string());

    emit_success(common.output(), "checkout", &report, Some(&human))
}

pub fn run_file(common: &CommonOptions, commit: Option<&str>, file: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.checkout_file(commit, file)?;

    let human = HumanOutput::new(format!(
        "gitlet checkout: restored {} from {}",
        report.path,
        report.commit.short()
    ));

    emit_success(common.output(), "checkout", &report, Some(&human))
}

pub fn run_reset(common: &CommonOptions, commit: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.reset(commit)?;

    let mut human = HumanOutput::new(format!(
        "gitlet reset: {} now at {}",
        report.branch,
        report.commit.short()
    ));
    human.push_summary("written", report.written.len().to_string());
    human.push_summary("deleted", report.deleted.len().to_string());

    emit_success(common.output(), "reset", &report, Some(&human))
}
