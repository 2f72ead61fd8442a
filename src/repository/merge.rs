use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::{info, warn};

use super::Repository;
use crate::ancestry::merge_base;
use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::ids::CommitId;
use crate::merge::{conflict_content, merge_snapshots, MergeConflict};

/// How a merge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// A two-parent commit was created
    Merged,
    /// The current branch was advanced to the other tip; HEAD stays on
    /// the current branch rather than switching to the merged one
    FastForwarded,
    /// The other tip is already part of the current history
    UpToDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub branch: String,
    pub other: String,
    pub status: MergeStatus,
    /// New branch tip; unchanged for `UpToDate`
    pub commit: CommitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<CommitId>,
    pub conflicts: Vec<MergeConflict>,
}

impl MergeReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

impl Repository {
    /// Merge `other` into the current branch with the current local time.
    pub fn merge(&self, other: &str) -> Result<MergeReport> {
        self.merge_at(other, &Local::now())
    }

    pub fn merge_at<Tz>(&self, other: &str, time: &DateTime<Tz>) -> Result<MergeReport>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let _lock = self.lock()?;
        self.merge_locked(other, time)
    }

    /// Merge with the repository lock already held.
    pub(super) fn merge_locked<Tz>(&self, other: &str, time: &DateTime<Tz>) -> Result<MergeReport>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let other_id = self
            .storage
            .read_branch(other)?
            .ok_or_else(|| Error::BranchNotFound(other.to_string()))?;

        let mut state = self.load_state()?;
        if state.branch == other {
            return Err(Error::MergeWithSelf);
        }
        if !state.stage.is_clean() {
            return Err(Error::UncommittedChanges);
        }

        let other_commit = self.storage.read_commit(&other_id)?;
        if let Some(path) = self
            .untracked_files(&state)?
            .into_iter()
            .find(|path| other_commit.tracked.contains_key(path))
        {
            return Err(Error::UntrackedFileInTheWay(path));
        }

        let up_to_date = |state_branch: String, head: CommitId, base: Option<CommitId>| {
            info!(branch = %state_branch, other, "already up to date");
            MergeReport {
                branch: state_branch,
                other: other.to_string(),
                status: MergeStatus::UpToDate,
                commit: head,
                base,
                conflicts: Vec::new(),
            }
        };

        if other_id == state.head.id {
            return Ok(up_to_date(state.branch, other_id.clone(), Some(other_id)));
        }

        let base = merge_base(&self.storage, &state.head.id, &other_id)?;
        if base == other_id {
            let head = state.head.id.clone();
            return Ok(up_to_date(state.branch, head, Some(base)));
        }

        if base == state.head.id {
            self.switch_to(&mut state, &other_commit)?;
            self.storage.write_stage(&state.stage)?;
            self.storage.write_branch(&state.branch, &other_id)?;
            info!(branch = %state.branch, other, commit = %other_id, "fast-forwarded");
            return Ok(MergeReport {
                branch: state.branch,
                other: other.to_string(),
                status: MergeStatus::FastForwarded,
                commit: other_id,
                base: Some(base),
                conflicts: Vec::new(),
            });
        }

        let base_commit = self.storage.read_commit(&base)?;
        let result = merge_snapshots(
            &self.storage,
            &base_commit.tracked,
            &state.head.tracked,
            &other_commit.tracked,
        )?;

        for (path, blob) in &result.take_other {
            let content = self.storage.read_blob(blob)?;
            self.worktree.write(path, &content)?;
            state.stage.stage_merge_addition(path, blob.clone());
        }
        for path in &result.remove {
            self.worktree.remove(path)?;
            state.stage.stage_merge_removal(path);
        }
        for conflict in &result.conflicts {
            let current = conflict
                .current
                .as_ref()
                .map(|blob| self.storage.read_blob(blob))
                .transpose()?;
            let theirs = conflict
                .other
                .as_ref()
                .map(|blob| self.storage.read_blob(blob))
                .transpose()?;
            let content = conflict_content(current.as_deref(), theirs.as_deref());
            let blob = self.storage.put_blob(&content, &conflict.path)?;
            self.worktree.write(&conflict.path, &content)?;
            state.stage.stage_merge_addition(&conflict.path, blob);
        }
        if result.has_conflicts() {
            warn!(
                conflicts = result.conflicts.len(),
                "Encountered a merge conflict."
            );
        }

        let message = format!("Merged {other} into {}.", state.branch);
        let commit = Commit::from_stage(
            message,
            &state.head,
            &state.stage,
            Some(other_id),
            time,
        );
        let commit = self.record_commit(&mut state, commit)?;

        Ok(MergeReport {
            branch: state.branch,
            other: other.to_string(),
            status: MergeStatus::Merged,
            commit: commit.id,
            base: Some(base),
            conflicts: result.conflicts,
        })
    }
}
