//! Staging area state machine.
//!
//! Holds pending additions (path -> blob id) and removals (paths), plus the
//! tracked map of the checked-out commit. A path is never pending in both
//! `addition` and `removal` at once.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::commit::Snapshot;
use crate::error::{Error, Result};
use crate::ids::BlobId;

/// Persisted staging area (`.gitlet/stage.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingArea {
    #[serde(default)]
    pub addition: BTreeMap<String, BlobId>,
    #[serde(default)]
    pub removal: BTreeSet<String>,
    /// Tracked map of the checked-out commit
    #[serde(default)]
    pub tracked: Snapshot,
}

/// What `stage_add` did with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// A pending removal was cancelled; nothing new was staged.
    RemovalCancelled,
    /// Content matches HEAD; any pending addition was dropped.
    MatchesHead,
    /// The blob is now staged for addition.
    Staged,
}

/// What `stage_remove` did with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    /// Only a pending addition was dropped; the working file stays.
    Unstaged,
    /// The path is staged for removal and its working file must be deleted.
    StagedForRemoval,
}

impl StagingArea {
    /// Staging area for a freshly checked-out commit.
    pub fn for_snapshot(tracked: Snapshot) -> Self {
        Self {
            addition: BTreeMap::new(),
            removal: BTreeSet::new(),
            tracked,
        }
    }

    /// True when nothing is pending.
    pub fn is_clean(&self) -> bool {
        self.addition.is_empty() && self.removal.is_empty()
    }

    /// Drop all pending changes and adopt a new tracked map.
    pub fn reset_to(&mut self, tracked: Snapshot) {
        self.addition.clear();
        self.removal.clear();
        self.tracked = tracked;
    }

    /// Record an add of `path` whose current content hashes to `blob`.
    ///
    /// `head_blob` is the blob HEAD's commit tracks for the path, if any.
    pub fn stage_add(&mut self, path: &str, blob: BlobId, head_blob: Option<&BlobId>) -> AddOutcome {
        if self.removal.remove(path) {
            return AddOutcome::RemovalCancelled;
        }
        if head_blob == Some(&blob) {
            self.addition.remove(path);
            return AddOutcome::MatchesHead;
        }
        self.addition.insert(path.to_string(), blob);
        AddOutcome::Staged
    }

    /// Record an `rm` of `path`.
    pub fn stage_remove(&mut self, path: &str, tracked_by_head: bool) -> Result<RemoveOutcome> {
        let was_staged = self.addition.remove(path).is_some();
        if !tracked_by_head {
            if was_staged {
                return Ok(RemoveOutcome::Unstaged);
            }
            return Err(Error::NoReasonToRemove(path.to_string()));
        }
        self.removal.insert(path.to_string());
        Ok(RemoveOutcome::StagedForRemoval)
    }

    /// Stage a blob for addition during a merge.
    pub fn stage_merge_addition(&mut self, path: &str, blob: BlobId) {
        self.removal.remove(path);
        self.addition.insert(path.to_string(), blob);
    }

    /// Stage a path for removal during a merge.
    pub fn stage_merge_removal(&mut self, path: &str) {
        self.addition.remove(path);
        self.removal.insert(path.to_string());
    }

    /// `tracked` minus every removal, plus every addition.
    pub fn apply_to(&self, tracked: &Snapshot) -> Snapshot {
        let mut next: Snapshot = tracked
            .iter()
            .filter(|(path, _)| !self.removal.contains(*path))
            .map(|(path, blob)| (path.clone(), blob.clone()))
            .collect();
        for (path, blob) in &self.addition {
            next.insert(path.clone(), blob.clone());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(content: &str, path: &str) -> BlobId {
        BlobId::for_content(content.as_bytes(), path)
    }

    #[test]
    fn add_then_readd_head_content_unstages() {
        let head = blob("1", "a.txt");
        let mut stage = StagingArea::default();

        let outcome = stage.stage_add("a.txt", blob("2", "a.txt"), Some(&head));
        assert_eq!(outcome, AddOutcome::Staged);
        assert!(stage.addition.contains_key("a.txt"));

        let outcome = stage.stage_add("a.txt", head.clone(), Some(&head));
        assert_eq!(outcome, AddOutcome::MatchesHead);
        assert!(stage.is_clean());
    }

    #[test]
    fn add_cancels_pending_removal_without_staging() {
        let head = blob("1", "a.txt");
        let mut stage = StagingArea::default();
        stage
            .stage_remove("a.txt", true)
            .expect("tracked path can be removed");
        assert!(stage.removal.contains("a.txt"));

        let outcome = stage.stage_add("a.txt", blob("2", "a.txt"), Some(&head));
        assert_eq!(outcome, AddOutcome::RemovalCancelled);
        assert!(stage.is_clean());
    }

    #[test]
    fn remove_untracked_unstaged_path_fails() {
        let mut stage = StagingArea::default();
        let result = stage.stage_remove("nope.txt", false);
        assert!(matches!(result, Err(Error::NoReasonToRemove(_))));
    }

    #[test]
    fn remove_staged_untracked_path_only_unstages() {
        let mut stage = StagingArea::default();
        stage.stage_add("new.txt", blob("x", "new.txt"), None);
        let outcome = stage.stage_remove("new.txt", false).expect("staged");
        assert_eq!(outcome, RemoveOutcome::Unstaged);
        assert!(stage.is_clean());
    }

    #[test]
    fn remove_tracked_path_clears_addition_first() {
        let mut stage = StagingArea::default();
        stage.stage_add("a.txt", blob("2", "a.txt"), Some(&blob("1", "a.txt")));
        let outcome = stage.stage_remove("a.txt", true).expect("tracked");
        assert_eq!(outcome, RemoveOutcome::StagedForRemoval);
        assert!(stage.addition.is_empty());
        assert!(stage.removal.contains("a.txt"));
    }

    #[test]
    fn merge_staging_keeps_sets_disjoint() {
        let mut stage = StagingArea::default();
        stage.stage_merge_removal("a.txt");
        stage.stage_merge_addition("a.txt", blob("x", "a.txt"));
        assert!(stage.removal.is_empty());
        stage.stage_merge_removal("a.txt");
        assert!(stage.addition.is_empty());
    }
}
