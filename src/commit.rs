//! Immutable commit records and the snapshot builder.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BlobId, CommitId};
use crate::stage::StagingArea;

/// Timestamp layout stored in every commit, e.g. `Thu Jan 1 00:00:00 1970 +0000`.
pub const TIMESTAMP_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Message of the root commit created by `init`.
pub const INITIAL_MESSAGE: &str = "initial commit";

/// Tracked map: path -> blob id, ordered by path.
pub type Snapshot = BTreeMap<String, BlobId>;

/// A snapshot of the tracked file set plus its place in the commit graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommitId>,
    /// Second parent, present only on merge commits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent2: Option<CommitId>,
    #[serde(default)]
    pub tracked: Snapshot,
}

impl Commit {
    /// Build a commit and derive its id from message, paths and timestamp.
    pub fn new<Tz>(
        message: impl Into<String>,
        tracked: Snapshot,
        parent: Option<CommitId>,
        parent2: Option<CommitId>,
        time: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let message = message.into();
        let timestamp = format_timestamp(time);
        let id = CommitId::for_commit(&message, tracked.keys().map(String::as_str), &timestamp);
        Self {
            id,
            message,
            timestamp,
            parent,
            parent2,
            tracked,
        }
    }

    /// The parentless root commit every repository starts from.
    pub fn initial() -> Self {
        Self::new(
            INITIAL_MESSAGE,
            Snapshot::new(),
            None,
            None,
            &DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    /// Compose HEAD's snapshot with the staged delta: removals drop out,
    /// additions win over prior tracked values.
    pub fn from_stage<Tz>(
        message: impl Into<String>,
        head: &Commit,
        stage: &StagingArea,
        parent2: Option<CommitId>,
        time: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let tracked = stage.apply_to(&head.tracked);
        Self::new(message, tracked, Some(head.id.clone()), parent2, time)
    }

    /// First parent, then second parent when present.
    pub fn parents(&self) -> impl Iterator<Item = &CommitId> {
        self.parent.iter().chain(self.parent2.iter())
    }

    pub fn is_merge(&self) -> bool {
        self.parent2.is_some()
    }

    pub fn blob(&self, path: &str) -> Option<&BlobId> {
        self.tracked.get(path)
    }

    /// Recompute the id from the stored fields.
    pub fn has_valid_id(&self) -> bool {
        CommitId::for_commit(
            &self.message,
            self.tracked.keys().map(String::as_str),
            &self.timestamp,
        ) == self.id
    }
}

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn blob(content: &str, path: &str) -> BlobId {
        BlobId::for_content(content.as_bytes(), path)
    }

    #[test]
    fn initial_commit_is_stable() {
        let first = Commit::initial();
        let second = Commit::initial();
        assert_eq!(first.id, second.id);
        assert_eq!(first.timestamp, "Thu Jan 1 00:00:00 1970 +0000");
        assert!(first.parent.is_none());
        assert!(first.tracked.is_empty());
        assert!(first.has_valid_id());
    }

    #[test]
    fn id_ignores_blob_contents() {
        let time = FixedOffset::east_opt(-8 * 3600)
            .expect("offset")
            .with_ymd_and_hms(2024, 3, 9, 12, 30, 5)
            .single()
            .expect("time");

        let mut left = Snapshot::new();
        left.insert("a.txt".to_string(), blob("1", "a.txt"));
        let mut right = Snapshot::new();
        right.insert("a.txt".to_string(), blob("2", "a.txt"));

        let one = Commit::new("msg", left, None, None, &time);
        let two = Commit::new("msg", right, None, None, &time);
        assert_eq!(one.id, two.id);
        assert_eq!(one.timestamp, "Sat Mar 9 12:30:05 2024 -0800");
    }

    #[test]
    fn from_stage_applies_removals_then_additions() {
        let time = DateTime::<Utc>::UNIX_EPOCH;
        let mut tracked = Snapshot::new();
        tracked.insert("keep.txt".to_string(), blob("k", "keep.txt"));
        tracked.insert("gone.txt".to_string(), blob("g", "gone.txt"));
        tracked.insert("edit.txt".to_string(), blob("old", "edit.txt"));
        let head = Commit::new("head", tracked, None, None, &time);

        let mut stage = StagingArea::default();
        stage.removal.insert("gone.txt".to_string());
        stage
            .addition
            .insert("edit.txt".to_string(), blob("new", "edit.txt"));
        stage
            .addition
            .insert("new.txt".to_string(), blob("n", "new.txt"));

        let next = Commit::from_stage("next", &head, &stage, None, &time);
        assert_eq!(next.parent.as_ref(), Some(&head.id));
        assert_eq!(
            next.tracked.keys().cloned().collect::<Vec<_>>(),
            vec!["edit.txt", "keep.txt", "new.txt"]
        );
        assert_eq!(next.blob("edit.txt"), Some(&blob("new", "edit.txt")));
        assert_eq!(next.parents().count(), 1);
    }
}
