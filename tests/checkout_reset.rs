mod support;

use gitlet::error::Error;
use support::TestRepo;

#[test]
fn checkout_branch_swaps_working_tree() {
    let repo = TestRepo::init();
    repo.commit_file("shared.txt", "shared", "base");
    repo.repo().create_branch("feature").unwrap();
    repo.checkout("feature");
    repo.commit_file("feature.txt", "f", "feature only");
    repo.checkout("master");
    repo.commit_file("nested/master.txt", "m", "master only");

    let report = repo.repo().checkout_branch("feature").unwrap();
    assert_eq!(report.branch, "feature");
    assert_eq!(report.deleted, vec!["nested/master.txt"]);
    assert!(repo.exists("feature.txt"));
    assert!(!repo.exists("nested/master.txt"));
    assert!(!repo.path().join("nested").exists());
    assert_eq!(repo.repo().current_branch().unwrap(), "feature");

    let state = repo.repo().load_state().unwrap();
    assert!(state.stage.is_clean());
    assert_eq!(state.stage.tracked, state.head.tracked);
}

#[test]
fn checkout_branch_errors() {
    let repo = TestRepo::init();
    repo.commit_file("a.txt", "a", "base");
    repo.repo().create_branch("other").unwrap();

    let err = repo.repo().checkout_branch("master").unwrap_err();
    assert!(matches!(err, Error::AlreadyOnBranch(_)));

    let err = repo.repo().checkout_branch("nope").unwrap_err();
    assert!(matches!(err, Error::BranchNotFound(_)));

    repo.write_file("stray.txt", "untracked");
    let err = repo.repo().checkout_branch("other").unwrap_err();
    assert!(matches!(err, Error::UntrackedFileInTheWay(path) if path == "stray.txt"));
    assert_eq!(repo.repo().current_branch().unwrap(), "master");
    assert!(repo.exists("stray.txt"));
}

#[test]
fn checkout_file_from_head_and_prefix() {
    let repo = TestRepo::init();
    let c1 = repo.commit_file("a.txt", "one", "one");
    repo.commit_file("a.txt", "two", "two");

    repo.write_file("a.txt", "scratch");
    repo.repo().checkout_file(None, "a.txt").unwrap();
    assert_eq!(repo.read_file("a.txt"), "two");

    let prefix = &c1.id.as_str()[..8];
    let report = repo.repo().checkout_file(Some(prefix), "a.txt").unwrap();
    assert_eq!(report.commit, c1.id);
    assert_eq!(repo.read_file("a.txt"), "one");

    // The stage is untouched by single-file checkout.
    assert!(repo.repo().load_state().unwrap().stage.is_clean());
}

#[test]
fn checkout_file_errors() {
    let repo = TestRepo::init();
    repo.commit_file("a.txt", "one", "one");

    let err = repo.repo().checkout_file(None, "missing.txt").unwrap_err();
    assert!(matches!(err, Error::FileNotInCommit(_)));

    let err = repo
        .repo()
        .checkout_file(Some("0000000000"), "a.txt")
        .unwrap_err();
    assert!(matches!(err, Error::CommitNotFound(_)));

    let err = repo.repo().checkout_file(Some("zz"), "a.txt").unwrap_err();
    assert!(matches!(err, Error::CommitNotFound(_)));
}

#[test]
fn reset_moves_branch_and_clears_stage() {
    let repo = TestRepo::init();
    let c1 = repo.commit_file("a.txt", "one", "one");
    repo.commit_file("b.txt", "b", "add b");

    repo.write_file("a.txt", "dirty");
    repo.add("a.txt");

    let report = repo.repo().reset(c1.id.short()).unwrap();
    assert_eq!(report.branch, "master");
    assert_eq!(report.commit, c1.id);
    assert_eq!(repo.head().id, c1.id);
    assert_eq!(repo.read_file("a.txt"), "one");
    assert!(!repo.exists("b.txt"));
    assert!(repo.repo().load_state().unwrap().stage.is_clean());
}

#[test]
fn reset_refuses_untracked_files() {
    let repo = TestRepo::init();
    let c1 = repo.commit_file("a.txt", "one", "one");
    let c2 = repo.commit_file("a.txt", "two", "two");
    repo.write_file("new.txt", "untracked");

    let err = repo.repo().reset(c1.id.as_str()).unwrap_err();
    assert!(matches!(err, Error::UntrackedFileInTheWay(_)));
    assert_eq!(repo.head().id, c2.id);

    let err = repo.repo().reset("ffffffffff").unwrap_err();
    assert!(matches!(err, Error::CommitNotFound(_)));
}

#[test]
fn branch_lifecycle() {
    let repo = TestRepo::init();
    let base = repo.commit_file("a.txt", "a", "base");

    assert_eq!(repo.repo().create_branch("topic").unwrap(), base.id);
    let err = repo.repo().create_branch("topic").unwrap_err();
    assert!(matches!(err, Error::BranchExists(_)));
    let err = repo.repo().create_branch("../escape").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = repo.repo().remove_branch("master").unwrap_err();
    assert!(matches!(err, Error::CannotRemoveCurrentBranch(_)));
    let err = repo.repo().remove_branch("ghost").unwrap_err();
    assert!(matches!(err, Error::BranchNotFound(_)));

    assert_eq!(repo.repo().remove_branch("topic").unwrap(), base.id);
    assert_eq!(repo.repo().list_branches().unwrap(), vec!["master"]);
    // Commits outlive their branch pointer.
    assert!(repo.repo().storage().has_commit(&base.id));
}

#[test]
fn nested_branch_names_clash_with_existing_branches() {
    let repo = TestRepo::init();
    repo.commit_file("a.txt", "a", "base");

    repo.repo().create_branch("feature").unwrap();
    let err = repo.repo().create_branch("feature/x").unwrap_err();
    assert!(matches!(
        &err,
        Error::BranchNameConflict { name, existing } if name == "feature/x" && existing == "feature"
    ));
    assert_eq!(err.exit_code(), 3);

    repo.repo().create_branch("topic/one").unwrap();
    let err = repo.repo().create_branch("topic").unwrap_err();
    assert!(matches!(
        err,
        Error::BranchNameConflict { existing, .. } if existing == "topic/one"
    ));

    assert_eq!(
        repo.repo().list_branches().unwrap(),
        vec!["feature", "master", "topic/one"]
    );
}

#[test]
fn removed_nested_branch_frees_its_prefix() {
    let repo = TestRepo::init();
    let base = repo.commit_file("a.txt", "a", "base");

    repo.repo().create_branch("origin/master").unwrap();
    repo.repo().remove_branch("origin/master").unwrap();
    assert_eq!(repo.repo().create_branch("origin").unwrap(), base.id);
    assert_eq!(repo.repo().list_branches().unwrap(), vec!["master", "origin"]);
}
