//! Three-way merge of tracked snapshots.
//!
//! The engine is pure: it compares a base, current and other snapshot path by
//! path and returns what the caller must write, stage, delete and flag as
//! conflicted. Nothing here touches the working tree or the stores.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::commit::Snapshot;
use crate::error::Result;
use crate::ids::BlobId;

/// Opening marker of the current side in a conflicted file
pub const CONFLICT_MARKER_OURS: &str = "<<<<<<< HEAD\n";

/// Separator between the two sides
pub const CONFLICT_MARKER_SEP: &str = "=======\n";

/// Closing marker after the other side
pub const CONFLICT_MARKER_THEIRS: &str = ">>>>>>>\n";

/// Blob content lookup used to decide whether two versions are equal.
pub trait BlobContents {
    fn blob_bytes(&self, id: &BlobId) -> Result<Vec<u8>>;

    /// Equal ids are equal content; otherwise compare the bytes.
    fn same_content(&self, left: &BlobId, right: &BlobId) -> Result<bool> {
        if left == right {
            return Ok(true);
        }
        Ok(self.blob_bytes(left)? == self.blob_bytes(right)?)
    }
}

/// Outcome of merging three snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    /// Resolved tracked map; conflicted paths still hold the current side
    pub merged: Snapshot,
    /// Paths to check out from the other side and stage
    pub take_other: Snapshot,
    /// Paths to delete and stop tracking
    pub remove: BTreeSet<String>,
    pub conflicts: Vec<MergeConflict>,
}

impl MergeResult {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// A single conflicted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeConflict {
    pub path: String,
    pub kind: MergeConflictKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<BlobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<BlobId>,
}

/// Conflict category for high-level reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeConflictKind {
    /// Both sides changed an existing file differently
    Content,
    /// Both sides added the path with different content
    AddAdd,
    /// One side changed the file, the other deleted it
    ModifyDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathDecision {
    Keep,
    TakeOther(BlobId),
    Delete,
    Conflict(MergeConflictKind),
}

/// Merge `current` and `other` against their common `base`.
pub fn merge_snapshots<B>(
    blobs: &B,
    base: &Snapshot,
    current: &Snapshot,
    other: &Snapshot,
) -> Result<MergeResult>
where
    B: BlobContents + ?Sized,
{
    let paths: BTreeSet<&String> = base
        .keys()
        .chain(current.keys())
        .chain(other.keys())
        .collect();

    let mut result = MergeResult {
        merged: current.clone(),
        ..MergeResult::default()
    };

    for path in paths {
        let base_blob = base.get(path);
        let current_blob = current.get(path);
        let other_blob = other.get(path);
        let decision = decide(blobs, base_blob, current_blob, other_blob)?;
        debug!(path = %path, ?decision, "merge decision");

        match decision {
            PathDecision::Keep => {}
            PathDecision::TakeOther(blob) => {
                result.merged.insert(path.clone(), blob.clone());
                result.take_other.insert(path.clone(), blob);
            }
            PathDecision::Delete => {
                result.merged.remove(path);
                result.remove.insert(path.clone());
            }
            PathDecision::Conflict(kind) => result.conflicts.push(MergeConflict {
                path: path.clone(),
                kind,
                current: current_blob.cloned(),
                other: other_blob.cloned(),
            }),
        }
    }

    Ok(result)
}

fn decide<B>(
    blobs: &B,
    base: Option<&BlobId>,
    current: Option<&BlobId>,
    other: Option<&BlobId>,
) -> Result<PathDecision>
where
    B: BlobContents + ?Sized,
{
    let decision = match (base, current, other) {
        (Some(base), Some(current), Some(other)) => {
            if blobs.same_content(base, other)? {
                PathDecision::Keep
            } else if blobs.same_content(base, current)? {
                PathDecision::TakeOther(other.clone())
            } else if blobs.same_content(current, other)? {
                PathDecision::Keep
            } else {
                PathDecision::Conflict(MergeConflictKind::Content)
            }
        }
        (Some(base), Some(current), None) => {
            if blobs.same_content(base, current)? {
                PathDecision::Delete
            } else {
                PathDecision::Conflict(MergeConflictKind::ModifyDelete)
            }
        }
        (Some(base), None, Some(other)) => {
            if blobs.same_content(base, other)? {
                PathDecision::Keep
            } else {
                PathDecision::Conflict(MergeConflictKind::ModifyDelete)
            }
        }
        (None, None, Some(other)) => PathDecision::TakeOther(other.clone()),
        (None, Some(current), Some(other)) => {
            if blobs.same_content(current, other)? {
                PathDecision::Keep
            } else {
                PathDecision::Conflict(MergeConflictKind::AddAdd)
            }
        }
        (Some(_), None, None) | (None, Some(_), None) | (None, None, None) => PathDecision::Keep,
    };
    Ok(decision)
}

/// Replacement content for a conflicted file.
///
/// A missing side contributes nothing; a present side that does not end in a
/// newline gets one so the markers stay on their own lines.
pub fn conflict_content(current: Option<&[u8]>, other: Option<&[u8]>) -> Vec<u8> {
    let mut content = Vec::new();
    content.extend_from_slice(CONFLICT_MARKER_OURS.as_bytes());
    push_side(&mut content, current);
    content.extend_from_slice(CONFLICT_MARKER_SEP.as_bytes());
    push_side(&mut content, other);
    content.extend_from_slice(CONFLICT_MARKER_THEIRS.as_bytes());
    content
}

fn push_side(content: &mut Vec<u8>, side: Option<&[u8]>) {
    let Some(bytes) = side else {
        return;
    };
    content.extend_from_slice(bytes);
    if !bytes.is_empty() && !bytes.ends_with(b"\n") {
        content.push(b'\n');
    }
}

/// Summarize conflicts for human-readable output.
pub fn summarize_conflicts(conflicts: &[MergeConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| format!("{} ({})", conflict.path, conflict_kind_label(conflict.kind)))
        .collect()
}

fn conflict_kind_label(kind: MergeConflictKind) -> &'static str {
    match kind {
        MergeConflictKind::Content => "content",
        MergeConflictKind::AddAdd => "add/add",
        MergeConflictKind::ModifyDelete => "modify/delete",
    }
}
