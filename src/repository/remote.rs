use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::{debug, info};

use super::{MergeReport, Repository};
use crate::ancestry::{ancestor_distances, is_ancestor};
use crate::error::{Error, Result};
use crate::ids::CommitId;
use crate::storage::{validate_branch_name, Storage};

#[derive(Debug, Clone, Serialize)]
pub struct PushReport {
    pub remote: String,
    pub branch: String,
    pub commit: CommitId,
    pub copied_commits: usize,
    pub copied_blobs: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub remote: String,
    /// Local `<remote>/<branch>` branch that now holds the fetched tip
    pub branch: String,
    pub commit: CommitId,
    pub copied_commits: usize,
    pub copied_blobs: usize,
}

/// Objects transferred between two stores.
#[derive(Debug, Default, Clone, Copy)]
struct Transfer {
    commits: usize,
    blobs: usize,
}

/// Copy every commit reachable from `tip` that `to` lacks, blobs first.
fn copy_history(from: &Storage, to: &Storage, tip: &CommitId) -> Result<Transfer> {
    let mut ids: Vec<CommitId> = ancestor_distances(from, tip)?.into_keys().collect();
    ids.sort();

    let mut transfer = Transfer::default();
    for id in ids {
        if to.has_commit(&id) {
            continue;
        }
        let commit = from.read_commit(&id)?;
        for blob in commit.tracked.values() {
            if !to.has_blob(blob) && to.put_blob_with_id(blob, &from.read_blob(blob)?)? {
                transfer.blobs += 1;
            }
        }
        to.put_commit(&commit)?;
        transfer.commits += 1;
    }
    debug!(
        tip = %tip,
        commits = transfer.commits,
        blobs = transfer.blobs,
        "copied history"
    );
    Ok(transfer)
}

fn validate_remote_name(name: &str) -> Result<()> {
    validate_branch_name(name)?;
    if name.contains('/') {
        return Err(Error::InvalidArgument(format!(
            "remote name '{name}' may not contain '/'"
        )));
    }
    Ok(())
}

impl Repository {
    /// Record a named path to another repository's `.gitlet` directory.
    pub fn add_remote(&self, name: &str, path: &Path) -> Result<()> {
        let _lock = self.lock()?;
        validate_remote_name(name)?;
        let mut remotes = self.storage.read_remotes()?;
        if remotes.contains_key(name) {
            return Err(Error::RemoteExists(name.to_string()));
        }
        remotes.insert(name.to_string(), path.to_path_buf());
        self.storage.write_remotes(&remotes)?;
        info!(remote = name, path = %path.display(), "added remote");
        Ok(())
    }

    pub fn remove_remote(&self, name: &str) -> Result<PathBuf> {
        let _lock = self.lock()?;
        let mut remotes = self.storage.read_remotes()?;
        let path = remotes
            .remove(name)
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()))?;
        self.storage.write_remotes(&remotes)?;
        info!(remote = name, "removed remote");
        Ok(path)
    }

    pub fn remotes(&self) -> Result<Vec<(String, PathBuf)>> {
        Ok(self.storage.read_remotes()?.into_iter().collect())
    }

    /// Store of a named remote; relative paths resolve against the work root.
    fn remote_storage(&self, name: &str) -> Result<Storage> {
        let remotes = self.storage.read_remotes()?;
        let path = remotes
            .get(name)
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()))?;
        let dir = if path.is_absolute() {
            path.clone()
        } else {
            self.root.join(path)
        };
        let remote = Storage::new(dir.clone());
        if !dir.is_dir() || !remote.is_initialized() {
            return Err(Error::RemoteDirectoryNotFound(dir));
        }
        Ok(remote)
    }

    /// Send the current head to `<remote>`'s `branch`.
    pub fn push(&self, remote: &str, branch: &str) -> Result<PushReport> {
        let _lock = self.lock()?;
        validate_branch_name(branch)?;
        let state = self.load_state()?;
        let target = self.remote_storage(remote)?;

        if let Some(remote_tip) = target.read_branch(branch)? {
            if !is_ancestor(&self.storage, &remote_tip, &state.head.id)? {
                return Err(Error::PushRejected {
                    remote: remote.to_string(),
                    branch: branch.to_string(),
                });
            }
        }

        let transfer = copy_history(&self.storage, &target, &state.head.id)?;
        target.write_branch(branch, &state.head.id)?;
        info!(remote, branch, commit = %state.head.id, "pushed");
        Ok(PushReport {
            remote: remote.to_string(),
            branch: branch.to_string(),
            commit: state.head.id,
            copied_commits: transfer.commits,
            copied_blobs: transfer.blobs,
        })
    }

    /// Copy `<remote>`'s `branch` into the local branch `<remote>/<branch>`.
    pub fn fetch(&self, remote: &str, branch: &str) -> Result<FetchReport> {
        let _lock = self.lock()?;
        self.fetch_locked(remote, branch)
    }

    fn fetch_locked(&self, remote: &str, branch: &str) -> Result<FetchReport> {
        let source = self.remote_storage(remote)?;
        let local = format!("{remote}/{branch}");
        let tip = source
            .read_branch(branch)?
            .ok_or_else(|| Error::RemoteBranchNotFound(local.clone()))?;

        let transfer = copy_history(&source, &self.storage, &tip)?;
        self.storage.write_branch(&local, &tip)?;
        info!(remote, branch, commit = %tip, "fetched");
        Ok(FetchReport {
            remote: remote.to_string(),
            branch: local,
            commit: tip,
            copied_commits: transfer.commits,
            copied_blobs: transfer.blobs,
        })
    }

    /// Fetch `<remote>`'s `branch`, then merge it into the current branch.
    pub fn pull(&self, remote: &str, branch: &str) -> Result<(FetchReport, MergeReport)> {
        self.pull_at(remote, branch, &Local::now())
    }

    pub fn pull_at<Tz>(
        &self,
        remote: &str,
        branch: &str,
        time: &DateTime<Tz>,
    ) -> Result<(FetchReport, MergeReport)>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let _lock = self.lock()?;
        let fetched = self.fetch_locked(remote, branch)?;
        let merged = self.merge_locked(&fetched.branch, time)?;
        Ok((fetched, merged))
    }
}
