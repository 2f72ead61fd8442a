use serde::Serialize;

use super::Repository;
use crate::error::Result;
use crate::ids::BlobId;

/// Why a path appears under "Modifications Not Staged For Commit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotStagedReason {
    Modified,
    Deleted,
}

impl NotStagedReason {
    pub fn label(self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotStagedEntry {
    pub path: String,
    pub reason: NotStagedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBranch {
    pub name: String,
    pub current: bool,
}

/// Everything `status` reports; every list is sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub branches: Vec<StatusBranch>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub not_staged: Vec<NotStagedEntry>,
    pub untracked: Vec<String>,
}

impl Repository {
    pub fn status(&self) -> Result<StatusReport> {
        let state = self.load_state()?;
        let stage = &state.stage;
        let head = &state.head;

        let branches = self
            .storage
            .list_branches()?
            .into_iter()
            .map(|name| StatusBranch {
                current: name == state.branch,
                name,
            })
            .collect();

        let mut staged = Vec::new();
        let mut not_staged = Vec::new();
        for (path, blob) in &stage.addition {
            match self.worktree.read(path)? {
                None => not_staged.push(NotStagedEntry {
                    path: path.clone(),
                    reason: NotStagedReason::Deleted,
                }),
                Some(content) if BlobId::for_content(&content, path) != *blob => {
                    not_staged.push(NotStagedEntry {
                        path: path.clone(),
                        reason: NotStagedReason::Modified,
                    });
                }
                Some(_) => staged.push(path.clone()),
            }
        }

        for (path, blob) in &head.tracked {
            if stage.addition.contains_key(path) || stage.removal.contains(path) {
                continue;
            }
            let reason = match self.worktree.read(path)? {
                None => NotStagedReason::Deleted,
                Some(content) if BlobId::for_content(&content, path) != *blob => {
                    NotStagedReason::Modified
                }
                Some(_) => continue,
            };
            not_staged.push(NotStagedEntry {
                path: path.clone(),
                reason,
            });
        }
        not_staged.sort_by(|a, b| a.path.cmp(&b.path));

        let untracked = self
            .worktree
            .list_files()?
            .into_iter()
            .filter(|path| {
                stage.removal.contains(path)
                    || (!stage.addition.contains_key(path) && !head.tracked.contains_key(path))
            })
            .collect();

        Ok(StatusReport {
            branches,
            staged,
            removed: stage.removal.iter().cloned().collect(),
            not_staged,
            untracked,
        })
    }
}
