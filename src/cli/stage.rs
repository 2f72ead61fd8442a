//! gitlet add / rm

use super::CommonOptions;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::stage::{AddOutcome, RemoveOutcome};

pub fn run_add(common: &CommonOptions, file: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.add(file)?;

    let header = match report.outcome {
        AddOutcome::Staged => format!("gitlet add: staged {}", report.path),
        AddOutcome::MatchesHead => {
            format!("gitlet add: {} matches HEAD, nothing staged", report.path)
        }
        AddOutcome::RemovalCancelled => {
            format!("gitlet add: cancelled removal of {}", report.path)
        }
    };
    let mut human = HumanOutput::new(header);
    if report.outcome == AddOutcome::Staged {
        human.push_summary("blob", report.blob.short());
    }

    emit_success(common.output(), "add", &report, Some(&human))
}

pub fn run_rm(common: &CommonOptions, file: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.remove(file)?;

    let header = match report.outcome {
        RemoveOutcome::Unstaged => format!("gitlet rm: unstaged {}", report.path),
        RemoveOutcome::StagedForRemoval => {
            format!("gitlet rm: {} staged for removal", report.path)
        }
    };
    let human = HumanOutput::new(header);

    emit_success(common.output(), "rm", &report, Some(&human))
}
