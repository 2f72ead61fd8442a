//! gitlet add-remote / rm-remote / push / fetch / pull

use std::path::PathBuf;

use serde::Serialize;

use super::merge::merge_human;
use super::CommonOptions;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::repository::{FetchReport, MergeReport};

#[derive(Debug, Serialize)]
struct RemoteReport {
    name: String,
    path: PathBuf,
}

#[derive(Debug, Serialize)]
struct PullReport {
    fetch: FetchReport,
    merge: MergeReport,
}

pub fn run_add(common: &CommonOptions, name: &str, path: PathBuf) -> Result<()> {
    let repository = common.open()?;
    repository.add_remote(name, &path)?;
    let report = RemoteReport {
        name: name.to_string(),
        path,
    };

    let mut human = HumanOutput::new(format!("gitlet add-remote: added {}", report.name));
    human.push_summary("path", report.path.display().to_string());

    emit_success(common.output(), "add-remote", &report, Some(&human))
}

pub fn run_remove(common: &CommonOptions, name: &str) -> Result<()> {
    let repository = common.open()?;
    let path = repository.remove_remote(name)?;
    let report = RemoteReport {
        name: name.to_string(),
        path,
    };

    let human = HumanOutput::new(format!("gitlet rm-remote: removed {}", report.name));

    emit_success(common.output(), "rm-remote", &report, Some(&human))
}

pub fn run_push(common: &CommonOptions, remote: &str, branch: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.push(remote, branch)?;

    let mut human = HumanOutput::new(format!(
        "gitlet push: {}/{} now at {}",
        report.remote,
        report.branch,
        report.commit.short()
    ));
    human.push_summary("commits copied", report.copied_commits.to_string());
    human.push_summary("blobs copied", report.copied_blobs.to_string());

    emit_success(common.output(), "push", &report, Some(&human))
}

fn fetch_human(report: &FetchReport) -> HumanOutput {
    let mut human = HumanOutput::new(format!(
        "gitlet fetch: {} now at {}",
        report.branch,
        report.commit.short()
    ));
    human.push_summary("commits copied", report.copied_commits.to_string());
    human.push_summary("blobs copied", report.copied_blobs.to_string());
    human
}

pub fn run_fetch(common: &CommonOptions, remote: &str, branch: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.fetch(remote, branch)?;
    let human = fetch_human(&report);
    emit_success(common.output(), "fetch", &report, Some(&human))
}

pub fn run_pull(common: &CommonOptions, remote: &str, branch: &str) -> Result<()> {
    let repository = common.open()?;
    let (fetch, merge) = repository.pull(remote, branch)?;

    let mut human = merge_human(&merge);
    human.push_summary(
        "fetched",
        format!("{} at {}", fetch.branch, fetch.commit.short()),
    );
    let report = PullReport { fetch, merge };

    emit_success(common.output(), "pull", &report, Some(&human))
}
