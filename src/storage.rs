//! Storage layer for gitlet
//!
//! All repository state lives under `.gitlet/` at the working-tree root.
//!
//! # Directory Structure
//!
//! ```text
//! .gitlet/
//!   HEAD                  # Name of the checked-out branch
//!   config.toml           # Repository configuration
//!   stage.json            # Staging area (addition, removal, tracked)
//!   remotes.json          # Remote name -> path of another .gitlet dir
//!   lock                  # Advisory lock held by mutating commands
//!   branches/<name>       # Commit id per branch (names may contain '/')
//!   commits/<id>.json     # Immutable commit records
//!   blobs/<id>            # Raw file contents
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::ancestry::CommitGraph;
use crate::commit::Commit;
use crate::config::CONFIG_FILE;
use crate::error::{Error, Result};
use crate::ids::{BlobId, CommitId, ID_HEX_LEN};
use crate::lock;
use crate::merge::BlobContents;
use crate::stage::StagingArea;
use crate::worktree::slash_path;

/// Name of the repository directory inside the working tree
pub const REPO_DIR: &str = ".gitlet";

const COMMIT_EXT: &str = "json";

/// Storage manager for one `.gitlet` directory
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Storage rooted at an existing or future `.gitlet` directory
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Storage for the repository whose working tree is `work_root`
    pub fn for_worktree(work_root: &Path) -> Self {
        Self::new(work_root.join(REPO_DIR))
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Path to the `.gitlet/` directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn head_file(&self) -> PathBuf {
        self.dir.join("HEAD")
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn stage_file(&self) -> PathBuf {
        self.dir.join("stage.json")
    }

    pub fn remotes_file(&self) -> PathBuf {
        self.dir.join("remotes.json")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.dir.join("lock")
    }

    pub fn branches_dir(&self) -> PathBuf {
        self.dir.join("branches")
    }

    pub fn commits_dir(&self) -> PathBuf {
        self.dir.join("commits")
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.dir.join("blobs")
    }

    pub fn branch_file(&self, name: &str) -> PathBuf {
        name.split('/')
            .fold(self.branches_dir(), |path, part| path.join(part))
    }

    pub fn commit_file(&self, id: &CommitId) -> PathBuf {
        self.commits_dir()
            .join(format!("{}.{}", id.as_str(), COMMIT_EXT))
    }

    pub fn blob_file(&self, id: &BlobId) -> PathBuf {
        self.blobs_dir().join(id.as_str())
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    /// Create the directory skeleton
    pub fn init_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::create_dir_all(self.branches_dir())?;
        fs::create_dir_all(self.commits_dir())?;
        fs::create_dir_all(self.blobs_dir())?;
        Ok(())
    }

    /// Check if the repository has been initialized
    pub fn is_initialized(&self) -> bool {
        self.head_file().is_file()
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    // =========================================================================
    // Blob store
    // =========================================================================

    /// Store `content` as it was added under `path`; returns its id.
    pub fn put_blob(&self, content: &[u8], path: &str) -> Result<BlobId> {
        let id = BlobId::for_content(content, path);
        self.put_blob_with_id(&id, content)?;
        Ok(id)
    }

    /// Store bytes under a known id; existing blobs are left alone.
    pub fn put_blob_with_id(&self, id: &BlobId, content: &[u8]) -> Result<bool> {
        let path = self.blob_file(id);
        if path.exists() {
            return Ok(false);
        }
        lock::write_atomic(&path, content)?;
        Ok(true)
    }

    pub fn read_blob(&self, id: &BlobId) -> Result<Vec<u8>> {
        let path = self.blob_file(id);
        if !path.is_file() {
            return Err(Error::CorruptObject {
                id: id.to_string(),
                reason: "blob is missing from the store".to_string(),
            });
        }
        Ok(fs::read(path)?)
    }

    pub fn has_blob(&self, id: &BlobId) -> bool {
        self.blob_file(id).is_file()
    }

    // =========================================================================
    // Commit store
    // =========================================================================

    /// Persist a commit. Re-storing an identical record is a no-op; a
    /// different record under the same id is refused.
    pub fn put_commit(&self, commit: &Commit) -> Result<()> {
        let path = self.commit_file(&commit.id);
        if path.exists() {
            let existing = self.read_commit(&commit.id)?;
            if existing == *commit {
                return Ok(());
            }
            return Err(Error::CommitIdCollision(commit.id.to_string()));
        }
        debug!(commit = %commit.id, message = %commit.message, "storing commit");
        self.write_json(&path, commit)
    }

    pub fn read_commit(&self, id: &CommitId) -> Result<Commit> {
        let path = self.commit_file(id);
        if !path.is_file() {
            return Err(Error::CommitNotFound(id.to_string()));
        }
        let commit: Commit = self.read_json(&path)?;
        if commit.id != *id {
            return Err(Error::CorruptObject {
                id: id.to_string(),
                reason: format!("record carries id {}", commit.id),
            });
        }
        Ok(commit)
    }

    pub fn has_commit(&self, id: &CommitId) -> bool {
        self.commit_file(id).is_file()
    }

    /// Every stored commit id, sorted.
    pub fn list_commit_ids(&self) -> Result<Vec<CommitId>> {
        let dir = self.commits_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(COMMIT_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Ok(id) = CommitId::parse(stem) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Resolve a full id or unambiguous prefix to a stored commit.
    pub fn resolve_commit(&self, spec: &str) -> Result<CommitId> {
        let prefix = spec.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return Err(Error::InvalidArgument("commit id cannot be empty".to_string()));
        }
        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) || prefix.len() > ID_HEX_LEN {
            return Err(Error::CommitNotFound(spec.to_string()));
        }

        if prefix.len() == ID_HEX_LEN {
            let id = CommitId::parse(&prefix)?;
            if self.has_commit(&id) {
                return Ok(id);
            }
            return Err(Error::CommitNotFound(spec.to_string()));
        }

        let mut matches: Vec<CommitId> = self
            .list_commit_ids()?
            .into_iter()
            .filter(|id| id.as_str().starts_with(&prefix))
            .collect();
        match matches.len() {
            0 => Err(Error::CommitNotFound(spec.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(Error::AmbiguousCommit {
                prefix: spec.to_string(),
                matches: n,
            }),
        }
    }

    // =========================================================================
    // Ref store
    // =========================================================================

    /// Name of the checked-out branch
    pub fn read_head(&self) -> Result<String> {
        let head = fs::read_to_string(self.head_file())?;
        let head = head.trim();
        if head.is_empty() {
            return Err(Error::CorruptObject {
                id: "HEAD".to_string(),
                reason: "HEAD names no branch".to_string(),
            });
        }
        Ok(head.to_string())
    }

    pub fn write_head(&self, branch: &str) -> Result<()> {
        lock::write_atomic_str(self.head_file(), branch)
    }

    pub fn read_branch(&self, name: &str) -> Result<Option<CommitId>> {
        validate_branch_name(name)?;
        let path = self.branch_file(name);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(Some(CommitId::parse(&raw)?))
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        validate_branch_name(name)?;
        Ok(self.branch_file(name).is_file())
    }

    /// An existing branch that `name` cannot live beside, since one would
    /// need the other's file as a directory.
    pub fn conflicting_branch(&self, name: &str) -> Result<Option<String>> {
        validate_branch_name(name)?;
        let mut prefix = String::new();
        for part in name.split('/') {
            if !prefix.is_empty() {
                if self.branch_file(&prefix).is_file() {
                    return Ok(Some(prefix));
                }
                prefix.push('/');
            }
            prefix.push_str(part);
        }

        let path = self.branch_file(name);
        if !path.is_dir() {
            return Ok(None);
        }
        let nested = format!("{name}/");
        if let Some(existing) = self
            .list_branches()?
            .into_iter()
            .find(|branch| branch.starts_with(&nested))
        {
            return Ok(Some(existing));
        }
        debug!(branch = name, "pruning stale branch directory");
        fs::remove_dir_all(&path)?;
        Ok(None)
    }

    pub fn write_branch(&self, name: &str, id: &CommitId) -> Result<()> {
        validate_branch_name(name)?;
        if !self.branch_file(name).is_file() {
            if let Some(existing) = self.conflicting_branch(name)? {
                return Err(Error::BranchNameConflict {
                    name: name.to_string(),
                    existing,
                });
            }
        }
        debug!(branch = name, commit = %id, "moving branch");
        lock::write_atomic_str(self.branch_file(name), id.as_str())
    }

    /// Delete a branch and any directories it leaves empty; returns false
    /// when it did not exist.
    pub fn delete_branch(&self, name: &str) -> Result<bool> {
        validate_branch_name(name)?;
        let path = self.branch_file(name);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;

        let root = self.branches_dir();
        let mut dir = path.parent().map(Path::to_path_buf);
        while let Some(current) = dir {
            if current == root || fs::remove_dir(&current).is_err() {
                break;
            }
            dir = current.parent().map(Path::to_path_buf);
        }
        Ok(true)
    }

    /// All branch names, sorted; nested names use '/'.
    pub fn list_branches(&self) -> Result<Vec<String>> {
        let root = self.branches_dir();
        let mut names = Vec::new();
        if !root.exists() {
            return Ok(names);
        }

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !entry.file_name().to_string_lossy().starts_with('.'));
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = slash_path(&root, entry.path()) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    // =========================================================================
    // Staging area
    // =========================================================================

    pub fn read_stage(&self) -> Result<StagingArea> {
        let path = self.stage_file();
        if !path.exists() {
            return Ok(StagingArea::default());
        }
        self.read_json(&path)
    }

    pub fn write_stage(&self, stage: &StagingArea) -> Result<()> {
        self.write_json(&self.stage_file(), stage)
    }

    // =========================================================================
    // Remotes
    // =========================================================================

    pub fn read_remotes(&self) -> Result<BTreeMap<String, PathBuf>> {
        let path = self.remotes_file();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        self.read_json(&path)
    }

    pub fn write_remotes(&self, remotes: &BTreeMap<String, PathBuf>) -> Result<()> {
        self.write_json(&self.remotes_file(), remotes)
    }
}

impl CommitGraph for Storage {
    fn parents(&self, id: &CommitId) -> Result<Vec<CommitId>> {
        Ok(self.read_commit(id)?.parents().cloned().collect())
    }
}

impl BlobContents for Storage {
    fn blob_bytes(&self, id: &BlobId) -> Result<Vec<u8>> {
        self.read_blob(id)
    }
}

/// Reject names that would escape `branches/` or collide with its layout.
pub fn validate_branch_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name.ends_with('/')
        || name.contains('\\')
        || name
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == ".." || part.starts_with('.'));
    if invalid {
        return Err(Error::InvalidArgument(format!("invalid branch name '{name}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    use crate::commit::Snapshot;

    fn storage() -> (TempDir, Storage) {
        let temp = TempDir::new().unwrap();
        let storage = Storage::for_worktree(temp.path());
        storage.init_dirs().unwrap();
        (temp, storage)
    }

    #[test]
    fn test_storage_paths() {
        let storage = Storage::for_worktree(Path::new("/work"));
        assert_eq!(storage.dir(), Path::new("/work/.gitlet"));
        assert_eq!(storage.head_file(), PathBuf::from("/work/.gitlet/HEAD"));
        assert_eq!(
            storage.branch_file("origin/master"),
            PathBuf::from("/work/.gitlet/branches/origin/master")
        );
        let id = Commit::initial().id;
        assert_eq!(
            storage.commit_file(&id),
            PathBuf::from(format!("/work/.gitlet/commits/{id}.json"))
        );
    }

    #[test]
    fn test_blob_round_trip() {
        let (_temp, storage) = storage();
        let id = storage.put_blob(b"hello", "a.txt").unwrap();
        assert!(storage.has_blob(&id));
        assert_eq!(storage.read_blob(&id).unwrap(), b"hello");
        assert!(!storage.put_blob_with_id(&id, b"hello").unwrap());
    }

    #[test]
    fn test_missing_blob_is_corrupt() {
        let (_temp, storage) = storage();
        let id = BlobId::for_content(b"never stored", "x");
        assert!(matches!(
            storage.read_blob(&id),
            Err(Error::CorruptObject { .. })
        ));
    }

    #[test]
    fn test_commit_store_and_collision() {
        let (_temp, storage) = storage();
        let initial = Commit::initial();
        storage.put_commit(&initial).unwrap();
        storage.put_commit(&initial).unwrap();
        assert_eq!(storage.read_commit(&initial.id).unwrap(), initial);

        let mut impostor = initial.clone();
        impostor.parent = Some(initial.id.clone());
        assert!(matches!(
            storage.put_commit(&impostor),
            Err(Error::CommitIdCollision(_))
        ));
    }

    #[test]
    fn test_resolve_commit_prefixes() {
        let (_temp, storage) = storage();
        let initial = Commit::initial();
        storage.put_commit(&initial).unwrap();
        let other = Commit::new(
            "second",
            Snapshot::new(),
            Some(initial.id.clone()),
            None,
            &DateTime::<Utc>::UNIX_EPOCH,
        );
        storage.put_commit(&other).unwrap();

        assert_eq!(storage.resolve_commit(initial.id.as_str()).unwrap(), initial.id);
        assert_eq!(storage.resolve_commit(&initial.id.as_str()[..8]).unwrap(), initial.id);
        assert!(matches!(
            storage.resolve_commit(""),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            storage.resolve_commit("not-hex"),
            Err(Error::CommitNotFound(_))
        ));

        let ids = storage.list_commit_ids().unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_branches_nested_and_sorted() {
        let (_temp, storage) = storage();
        let id = Commit::initial().id;
        storage.write_branch("master", &id).unwrap();
        storage.write_branch("origin/master", &id).unwrap();
        storage.write_branch("feature", &id).unwrap();

        assert_eq!(
            storage.list_branches().unwrap(),
            vec!["feature", "master", "origin/master"]
        );
        assert_eq!(storage.read_branch("origin/master").unwrap(), Some(id));
        assert!(storage.delete_branch("feature").unwrap());
        assert!(!storage.delete_branch("feature").unwrap());
        assert_eq!(storage.read_branch("feature").unwrap(), None);
    }

    #[test]
    fn test_nested_branch_names_conflict_both_ways() {
        let (_temp, storage) = storage();
        let id = Commit::initial().id;
        storage.write_branch("feature", &id).unwrap();
        match storage.write_branch("feature/x", &id) {
            Err(Error::BranchNameConflict { name, existing }) => {
                assert_eq!(name, "feature/x");
                assert_eq!(existing, "feature");
            }
            other => panic!("expected a name conflict, got {other:?}"),
        }

        storage.write_branch("origin/master", &id).unwrap();
        assert_eq!(
            storage.conflicting_branch("origin").unwrap(),
            Some("origin/master".to_string())
        );
        assert!(matches!(
            storage.write_branch("origin", &id),
            Err(Error::BranchNameConflict { .. })
        ));

        // Moving an existing branch is never a conflict.
        storage.write_branch("origin/master", &id).unwrap();
    }

    #[test]
    fn test_delete_branch_prunes_empty_directories() {
        let (_temp, storage) = storage();
        let id = Commit::initial().id;
        storage.write_branch("origin/topic/one", &id).unwrap();
        assert!(storage.delete_branch("origin/topic/one").unwrap());
        assert!(!storage.branches_dir().join("origin").exists());
        assert!(storage.branches_dir().exists());

        storage.write_branch("origin", &id).unwrap();
        assert_eq!(storage.list_branches().unwrap(), vec!["origin"]);
    }

    #[test]
    fn test_stale_branch_directory_is_pruned() {
        let (_temp, storage) = storage();
        let id = Commit::initial().id;
        fs::create_dir_all(storage.branches_dir().join("old").join("empty")).unwrap();
        assert_eq!(storage.conflicting_branch("old").unwrap(), None);
        storage.write_branch("old", &id).unwrap();
        assert_eq!(storage.read_branch("old").unwrap(), Some(id));
    }

    #[test]
    fn test_branch_names_validated() {
        for bad in ["", "../x", "a//b", "/abs", ".hidden", "a\\b", "trailing/"] {
            assert!(validate_branch_name(bad).is_err(), "{bad} should be rejected");
        }
        validate_branch_name("origin/feature-1").unwrap();
    }

    #[test]
    fn test_stage_defaults_when_missing() {
        let (_temp, storage) = storage();
        assert_eq!(storage.read_stage().unwrap(), StagingArea::default());

        let mut stage = StagingArea::default();
        stage.removal.insert("a.txt".to_string());
        storage.write_stage(&stage).unwrap();
        assert_eq!(storage.read_stage().unwrap(), stage);
    }

    #[test]
    fn test_head_round_trip() {
        let (_temp, storage) = storage();
        assert!(!storage.is_initialized());
        storage.write_head("master").unwrap();
        assert!(storage.is_initialized());
        assert_eq!(storage.read_head().unwrap(), "master");
    }
}
