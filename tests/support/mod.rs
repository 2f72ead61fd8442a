#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use gitlet::commit::Commit;
use gitlet::repository::MergeReport;
use gitlet::Repository;
use tempfile::TempDir;

/// Fixed, strictly increasing commit times so ids never collide.
pub fn time(minutes: i64) -> DateTime<FixedOffset> {
    let offset = FixedOffset::west_opt(8 * 3600).expect("offset");
    let start = offset
        .with_ymd_and_hms(2024, 3, 9, 12, 0, 0)
        .single()
        .expect("start time");
    start + Duration::minutes(minutes)
}

pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let repo = Repository::init(dir.path()).expect("init repository");
        Self {
            dir,
            repo,
            clock: Cell::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn gitlet_dir(&self) -> PathBuf {
        self.dir.path().join(".gitlet")
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Reopen from disk, picking up config changes.
    pub fn reopen(&mut self) {
        self.repo = Repository::open(self.dir.path()).expect("reopen repository");
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn read_file(&self, rel_path: &str) -> String {
        fs::read_to_string(self.dir.path().join(rel_path)).expect("read file")
    }

    pub fn exists(&self, rel_path: &str) -> bool {
        self.dir.path().join(rel_path).is_file()
    }

    pub fn delete_file(&self, rel_path: &str) {
        fs::remove_file(self.dir.path().join(rel_path)).expect("delete file");
    }

    pub fn next_time(&self) -> DateTime<FixedOffset> {
        let minutes = self.clock.get() + 1;
        self.clock.set(minutes);
        time(minutes)
    }

    pub fn add(&self, rel_path: &str) {
        self.repo.add(rel_path).expect("add");
    }

    pub fn commit(&self, message: &str) -> Commit {
        self.repo
            .commit_at(message, &self.next_time())
            .expect("commit")
    }

    /// Write, stage and commit a single file.
    pub fn commit_file(&self, rel_path: &str, contents: &str, message: &str) -> Commit {
        self.write_file(rel_path, contents);
        self.add(rel_path);
        self.commit(message)
    }

    pub fn checkout(&self, branch: &str) {
        self.repo.checkout_branch(branch).expect("checkout branch");
    }

    pub fn merge(&self, branch: &str) -> MergeReport {
        self.repo
            .merge_at(branch, &self.next_time())
            .expect("merge")
    }

    pub fn head(&self) -> Commit {
        self.repo.head_commit().expect("head commit")
    }

    pub fn commit_count(&self) -> usize {
        self.repo.global_log().expect("global log").len()
    }
}
