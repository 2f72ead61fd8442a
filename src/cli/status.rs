//! gitlet status command implementation

use super::CommonOptions;
use crate::error::Result;
use crate::output::emit_text;
use crate::repository::StatusReport;

pub fn format_status(report: &StatusReport) -> String {
    let mut lines = vec!["=== Branches ===".to_string()];
    for branch in &report.branches {
        if branch.current {
            lines.push(format!("*{}", branch.name));
        } else {
            lines.push(branch.name.clone());
        }
    }

    lines.push(String::new());
    lines.push("=== Staged Files ===".to_string());
    lines.extend(report.staged.iter().cloned());

    lines.push(String::new());
    lines.push("=== Removed Files ===".to_string());
    lines.extend(report.removed.iter().cloned());

    lines.push(String::new());
    lines.push("=== Modifications Not Staged For Commit ===".to_string());
    lines.extend(
        report
            .not_staged
            .iter()
            .map(|entry| format!("{} ({})", entry.path, entry.reason.label())),
    );

    lines.push(String::new());
    lines.push("=== Untracked Files ===".to_string());
    lines.extend(report.untracked.iter().cloned());

    lines.push(String::new());
    lines.join("\n") + "\n"
}

pub fn run(common: &CommonOptions) -> Result<()> {
    let repository = common.open()?;
    let report = repository.status()?;
    emit_text(common.output(), "status", &report, &format_status(&report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{NotStagedEntry, NotStagedReason, StatusBranch};

    #[test]
    fn status_text_layout() {
        let report = StatusReport {
            branches: vec![
                StatusBranch {
                    name: "master".to_string(),
                    current: true,
                },
                StatusBranch {
                    name: "other".to_string(),
                    current: false,
                },
            ],
            staged: vec!["wug.txt".to_string()],
            removed: vec!["goodbye.txt".to_string()],
            not_staged: vec![NotStagedEntry {
                path: "junk.txt".to_string(),
                reason: NotStagedReason::Deleted,
            }],
            untracked: vec!["random.stuff".to_string()],
        };

        let expected = "=== Branches ===\n*master\nother\n\n\
=== Staged Files ===\nwug.txt\n\n\
=== Removed Files ===\ngoodbye.txt\n\n\
=== Modifications Not Staged For Commit ===\njunk.txt (deleted)\n\n\
=== Untracked Files ===\nrandom.stuff\n\n";
        assert_eq!(format_status(&report), expected);
    }
}
