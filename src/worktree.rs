//! Working-tree file access.
//!
//! Paths are always relative to the working-tree root and use `/` as the
//! separator. The `.gitlet` directory and configured ignore patterns are
//! invisible to every scan.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::storage::REPO_DIR;

#[derive(Debug, Clone)]
pub struct WorkTree {
    root: PathBuf,
    ignore: Vec<glob::Pattern>,
}

impl WorkTree {
    pub fn new(root: PathBuf, ignore: Vec<glob::Pattern>) -> Self {
        Self { root, ignore }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a relative path.
    pub fn path_of(&self, rel: &str) -> PathBuf {
        rel.split('/').fold(self.root.clone(), |path, part| path.join(part))
    }

    pub fn is_ignored(&self, rel: &str) -> bool {
        self.ignore.iter().any(|pattern| pattern.matches(rel))
    }

    /// Every visible regular file, recursively, sorted.
    pub fn list_files(&self) -> Result<BTreeSet<String>> {
        let mut files = BTreeSet::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| entry.depth() != 1 || entry.file_name() != REPO_DIR);

        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = slash_path(&self.root, entry.path()) else {
                continue;
            };
            if !self.is_ignored(&rel) {
                files.insert(rel);
            }
        }

        Ok(files)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path_of(rel).is_file()
    }

    /// File content, or `None` when the file is absent.
    pub fn read(&self, rel: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_of(rel);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    /// Create or overwrite a file, creating parent directories.
    pub fn write(&self, rel: &str, content: &[u8]) -> Result<()> {
        let path = self.path_of(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Delete a file and any directories it leaves empty; false if absent.
    pub fn remove(&self, rel: &str) -> Result<bool> {
        let path = self.path_of(rel);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;

        let mut dir = path.parent().map(Path::to_path_buf);
        while let Some(current) = dir {
            if current == self.root || fs::remove_dir(&current).is_err() {
                break;
            }
            dir = current.parent().map(Path::to_path_buf);
        }
        Ok(true)
    }
}

/// `path` below `base`, joined with '/'.
pub(crate) fn slash_path(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Normalize a user-supplied path to the tracked `a/b.txt` form.
pub fn normalize_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('/') || Path::new(trimmed).is_absolute() {
        return Err(Error::InvalidArgument(format!(
            "path must be relative to the working tree: {raw}"
        )));
    }

    let mut parts = Vec::new();
    for part in trimmed.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(Error::InvalidArgument(format!(
                    "path may not leave the working tree: {raw}"
                )))
            }
            _ => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidArgument("path cannot be empty".to_string()));
    }
    if parts[0] == REPO_DIR {
        return Err(Error::InvalidArgument(format!(
            "{REPO_DIR} is not part of the working tree"
        )));
    }
    Ok(parts.join("/"))
}
