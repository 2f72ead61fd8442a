use serde::Serialize;
use tracing::{debug, info};

use super::{RepoState, Repository};
use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::ids::CommitId;
use crate::worktree::normalize_path;

/// Result of `checkout <branch>`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReport {
    pub branch: String,
    pub commit: CommitId,
    pub written: Vec<String>,
    pub deleted: Vec<String>,
}

/// Result of restoring a single file.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutFileReport {
    pub commit: CommitId,
    pub path: String,
}

/// Result of `reset`.
#[derive(Debug, Clone, Serialize)]
pub struct ResetReport {
    pub branch: String,
    pub commit: CommitId,
    pub written: Vec<String>,
    pub deleted: Vec<String>,
}

/// Working-tree changes made while switching snapshots.
pub(super) struct SwitchedFiles {
    pub written: Vec<String>,
    pub deleted: Vec<String>,
}

impl Repository {
    /// Replace the working tree with `target`'s snapshot and clear the stage.
    ///
    /// Refuses before touching anything if an untracked file is present.
    pub(super) fn switch_to(&self, state: &mut RepoState, target: &Commit) -> Result<SwitchedFiles> {
        if let Some(path) = self.untracked_files(state)?.into_iter().next() {
            return Err(Error::UntrackedFileInTheWay(path));
        }

        let mut deleted = Vec::new();
        for path in self.worktree.list_files()? {
            if !target.tracked.contains_key(&path) && self.worktree.remove(&path)? {
                deleted.push(path);
            }
        }

        let mut written = Vec::with_capacity(target.tracked.len());
        for (path, blob) in &target.tracked {
            let content = self.storage.read_blob(blob)?;
            self.worktree.write(path, &content)?;
            written.push(path.clone());
        }

        state.stage.reset_to(target.tracked.clone());
        debug!(
            commit = %target.id,
            written = written.len(),
            deleted = deleted.len(),
            "switched working tree"
        );
        Ok(SwitchedFiles { written, deleted })
    }

    /// Switch to another branch.
    pub fn checkout_branch(&self, name: &str) -> Result<CheckoutReport> {
        let _lock = self.lock()?;
        let target_id = self
            .storage
            .read_branch(name)?
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;

        let mut state = self.load_state()?;
        if state.branch == name {
            return Err(Error::AlreadyOnBranch(name.to_string()));
        }

        let target = self.storage.read_commit(&target_id)?;
        let files = self.switch_to(&mut state, &target)?;
        self.storage.write_stage(&state.stage)?;
        self.storage.write_head(name)?;

        info!(from = %state.branch, to = name, commit = %target_id, "checked out branch");
        Ok(CheckoutReport {
            branch: name.to_string(),
            commit: target_id,
            written: files.written,
            deleted: files.deleted,
        })
    }

    /// Restore one file from HEAD, or from the commit a prefix names.
    ///
    /// The staging area is left untouched.
    pub fn checkout_file(&self, commit: Option<&str>, path: &str) -> Result<CheckoutFileReport> {
        let _lock = self.lock()?;
        let rel = normalize_path(path)?;
        let id = match commit {
            Some(spec) => self.storage.resolve_commit(spec)?,
            None => self.load_state()?.head.id,
        };

        let source = self.storage.read_commit(&id)?;
        let blob = source
            .blob(&rel)
            .ok_or_else(|| Error::FileNotInCommit(rel.clone()))?;
        let content = self.storage.read_blob(blob)?;
        self.worktree.write(&rel, &content)?;

        info!(path = %rel, commit = %id, "checked out file");
        Ok(CheckoutFileReport { commit: id, path: rel })
    }

    /// Move the current branch to a commit and check out its snapshot.
    pub fn reset(&self, commit: &str) -> Result<ResetReport> {
        let _lock = self.lock()?;
        let id = self.storage.resolve_commit(commit)?;
        let target = self.storage.read_commit(&id)?;

        let mut state = self.load_state()?;
        let files = self.switch_to(&mut state, &target)?;
        self.storage.write_stage(&state.stage)?;
        self.storage.write_branch(&state.branch, &id)?;

        info!(branch = %state.branch, commit = %id, "reset");
        Ok(ResetReport {
            branch: state.branch,
            commit: id,
            written: files.written,
            deleted: files.deleted,
        })
    }
}
