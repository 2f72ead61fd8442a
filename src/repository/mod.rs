//! Repository operations.
//!
//! Every operation loads an explicit [`RepoState`] (current branch, HEAD
//! commit, staging area) at its start and persists what it changed at its
//! end. Mutating operations hold the repository lock for their duration.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::info;

use crate::commit::Commit;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ids::{BlobId, CommitId};
use crate::lock::FileLock;
use crate::stage::{AddOutcome, RemoveOutcome, StagingArea};
use crate::storage::{validate_branch_name, Storage};
use crate::worktree::{normalize_path, WorkTree};

mod checkout;
mod merge;
mod remote;
mod status;

pub use checkout::{CheckoutFileReport, CheckoutReport, ResetReport};
pub use merge::{MergeReport, MergeStatus};
pub use remote::{FetchReport, PushReport};
pub use status::{NotStagedReason, NotStagedEntry, StatusBranch, StatusReport};

/// Branch created by `init`
pub const DEFAULT_BRANCH: &str = "master";

/// State every operation reads at its start.
#[derive(Debug, Clone)]
pub struct RepoState {
    /// Checked-out branch
    pub branch: String,
    /// Commit the branch points at
    pub head: Commit,
    pub stage: StagingArea,
}

/// Result of `add`.
#[derive(Debug, Clone, Serialize)]
pub struct AddReport {
    pub path: String,
    pub blob: BlobId,
    pub outcome: AddOutcome,
}

/// Result of `rm`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveReport {
    pub path: String,
    pub outcome: RemoveOutcome,
}

/// A gitlet repository rooted at a working-tree directory.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    storage: Storage,
    config: Config,
    worktree: WorkTree,
}

impl Repository {
    /// Create `.gitlet/` with the root commit on `master`.
    pub fn init(root: &Path) -> Result<Self> {
        let storage = Storage::for_worktree(root);
        if storage.dir().exists() {
            return Err(Error::AlreadyInitialized(root.to_path_buf()));
        }

        storage.init_dirs()?;
        Config::default().save(&storage.config_file())?;

        let initial = Commit::initial();
        storage.put_commit(&initial)?;
        storage.write_branch(DEFAULT_BRANCH, &initial.id)?;
        storage.write_stage(&StagingArea::default())?;
        storage.write_head(DEFAULT_BRANCH)?;
        info!(root = %root.display(), commit = %initial.id, "initialized repository");

        Self::open(root)
    }

    /// Open an initialized repository.
    pub fn open(root: &Path) -> Result<Self> {
        let storage = Storage::for_worktree(root);
        if !storage.is_initialized() {
            return Err(Error::NotInitialized(root.to_path_buf()));
        }

        let config = Config::load_from_dir(storage.dir())?;
        let worktree = WorkTree::new(root.to_path_buf(), config.worktree.ignore_patterns()?);
        Ok(Self {
            root: root.to_path_buf(),
            storage,
            config,
            worktree,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn worktree(&self) -> &WorkTree {
        &self.worktree
    }

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(self.storage.lock_file(), self.config.lock.timeout_ms)
    }

    /// Load branch, HEAD commit and staging area.
    pub fn load_state(&self) -> Result<RepoState> {
        let branch = self.storage.read_head()?;
        let head_id = self
            .storage
            .read_branch(&branch)?
            .ok_or_else(|| Error::CorruptObject {
                id: "HEAD".to_string(),
                reason: format!("HEAD names missing branch '{branch}'"),
            })?;
        let head = self.storage.read_commit(&head_id)?;
        let stage = self.storage.read_stage()?;
        Ok(RepoState {
            branch,
            head,
            stage,
        })
    }

    pub fn current_branch(&self) -> Result<String> {
        self.storage.read_head()
    }

    pub fn head_commit(&self) -> Result<Commit> {
        Ok(self.load_state()?.head)
    }

    /// Working files that are neither tracked by HEAD nor staged for addition.
    fn untracked_files(&self, state: &RepoState) -> Result<Vec<String>> {
        Ok(self
            .worktree
            .list_files()?
            .into_iter()
            .filter(|path| {
                !state.stage.addition.contains_key(path) && !state.head.tracked.contains_key(path)
            })
            .collect())
    }

    // =========================================================================
    // Staging
    // =========================================================================

    /// Stage the working version of `path`.
    pub fn add(&self, path: &str) -> Result<AddReport> {
        let _lock = self.lock()?;
        let rel = normalize_path(path)?;
        let mut state = self.load_state()?;

        let content = self
            .worktree
            .read(&rel)?
            .ok_or_else(|| Error::FileNotFound(rel.clone()))?;
        let blob = BlobId::for_content(&content, &rel);
        let outcome = state
            .stage
            .stage_add(&rel, blob.clone(), state.head.blob(&rel));
        if outcome == AddOutcome::Staged {
            self.storage.put_blob_with_id(&blob, &content)?;
        }
        self.storage.write_stage(&state.stage)?;

        info!(path = %rel, ?outcome, "add");
        Ok(AddReport {
            path: rel,
            blob,
            outcome,
        })
    }

    /// Unstage `path`, and stop tracking it if HEAD tracks it.
    pub fn remove(&self, path: &str) -> Result<RemoveReport> {
        let _lock = self.lock()?;
        let rel = normalize_path(path)?;
        let mut state = self.load_state()?;

        let tracked = state.head.tracked.contains_key(&rel);
        let outcome = state.stage.stage_remove(&rel, tracked)?;
        if outcome == RemoveOutcome::StagedForRemoval {
            self.worktree.remove(&rel)?;
        }
        self.storage.write_stage(&state.stage)?;

        info!(path = %rel, ?outcome, "rm");
        Ok(RemoveReport { path: rel, outcome })
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Commit the staged changes with the current local time.
    pub fn commit(&self, message: &str) -> Result<Commit> {
        self.commit_at(message, &Local::now())
    }

    /// Commit the staged changes, stamping the commit with `time`.
    pub fn commit_at<Tz>(&self, message: &str, time: &DateTime<Tz>) -> Result<Commit>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let _lock = self.lock()?;
        if message.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }

        let mut state = self.load_state()?;
        if state.stage.is_clean() {
            return Err(Error::NothingToCommit);
        }

        let commit = Commit::from_stage(message, &state.head, &state.stage, None, time);
        self.record_commit(&mut state, commit)
    }

    /// Store a new HEAD commit, advance the branch and clear the stage.
    fn record_commit(&self, state: &mut RepoState, commit: Commit) -> Result<Commit> {
        self.storage.put_commit(&commit)?;
        self.storage.write_branch(&state.branch, &commit.id)?;
        state.stage.reset_to(commit.tracked.clone());
        self.storage.write_stage(&state.stage)?;

        info!(
            branch = %state.branch,
            commit = %commit.id,
            parents = commit.parents().count(),
            "committed"
        );
        state.head = commit.clone();
        Ok(commit)
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// Create a branch at HEAD's commit.
    pub fn create_branch(&self, name: &str) -> Result<CommitId> {
        let _lock = self.lock()?;
        validate_branch_name(name)?;
        if self.storage.branch_exists(name)? {
            return Err(Error::BranchExists(name.to_string()));
        }
        let state = self.load_state()?;
        self.storage.write_branch(name, &state.head.id)?;
        info!(branch = name, commit = %state.head.id, "created branch");
        Ok(state.head.id)
    }

    /// Delete a branch pointer; its commits stay in the store.
    pub fn remove_branch(&self, name: &str) -> Result<CommitId> {
        let _lock = self.lock()?;
        let target = self
            .storage
            .read_branch(name)?
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        if self.storage.read_head()? == name {
            return Err(Error::CannotRemoveCurrentBranch(name.to_string()));
        }
        self.storage.delete_branch(name)?;
        info!(branch = name, "removed branch");
        Ok(target)
    }

    pub fn list_branches(&self) -> Result<Vec<String>> {
        self.storage.list_branches()
    }

    // =========================================================================
    // History
    // =========================================================================

    /// First-parent history from HEAD back to the root commit.
    pub fn log(&self) -> Result<Vec<Commit>> {
        let state = self.load_state()?;
        let mut history = Vec::new();
        let mut next = Some(state.head.id.clone());
        while let Some(id) = next {
            let commit = self.storage.read_commit(&id)?;
            next = commit.parent.clone();
            history.push(commit);
        }
        Ok(history)
    }

    /// Every commit ever made, ordered by id.
    pub fn global_log(&self) -> Result<Vec<Commit>> {
        self.storage
            .list_commit_ids()?
            .iter()
            .map(|id| self.storage.read_commit(id))
            .collect()
    }

    /// Ids of every commit whose message is exactly `message`.
    pub fn find(&self, message: &str) -> Result<Vec<CommitId>> {
        let found: Vec<CommitId> = self
            .global_log()?
            .into_iter()
            .filter(|commit| commit.message == message)
            .map(|commit| commit.id)
            .collect();
        if found.is_empty() {
            return Err(Error::NoCommitWithMessage(message.to_string()));
        }
        Ok(found)
    }
}
