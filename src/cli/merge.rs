//! gitlet merge command implementation

use super::CommonOptions;
use crate::error::Result;
use crate::merge::summarize_conflicts;
use crate::output::{emit_success, HumanOutput};
use crate::repository::{MergeReport, MergeStatus};

/// Human rendering shared by `merge` and `pull`.
pub fn merge_human(report: &MergeReport) -> HumanOutput {
    let mut human = match report.status {
        MergeStatus::Merged => {
            let mut human = HumanOutput::new(format!(
                "gitlet merge: merged {} into {}",
                report.other, report.branch
            ));
            human.push_summary("commit", report.commit.short());
            human
        }
        MergeStatus::FastForwarded => {
            let mut human = HumanOutput::new("gitlet merge: Current branch fast-forwarded.");
            human.push_summary("commit", report.commit.short());
            human
        }
        MergeStatus::UpToDate => {
            HumanOutput::new("gitlet merge: Given branch is an ancestor of the current branch.")
        }
    };

    if let Some(base) = &report.base {
        human.push_summary("base", base.short());
    }
    if report.has_conflicts() {
        human.push_warning("Encountered a merge conflict.");
        for line in summarize_conflicts(&report.conflicts) {
            human.push_detail(line);
        }
        human.push_next_step("resolve the conflict markers, then gitlet add and gitlet commit");
    }
    human
}

pub fn run(common: &CommonOptions, branch: &str) -> Result<()> {
    let repository = common.open()?;
    let report = repository.merge(branch)?;
    let human = merge_human(&report);
    emit_success(common.output(), "merge", &report, Some(&human))
}
