use std::path::PathBuf;

use gitlet::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::NotInitialized(PathBuf::from("/tmp/nowhere"));
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let precondition = Error::UntrackedFileInTheWay("a.txt".to_string());
    assert_eq!(precondition.exit_code(), exit_codes::PRECONDITION_FAILED);

    let op = Error::CorruptObject {
        id: "abc".to_string(),
        reason: "truncated".to_string(),
    };
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn kinds_follow_taxonomy() {
    assert_eq!(Error::InvalidArgument("x".into()).kind(), "usage_error");
    assert_eq!(
        Error::AlreadyInitialized(PathBuf::from(".")).kind(),
        "repository_state_error"
    );
    assert_eq!(Error::BranchNotFound("x".into()).kind(), "reference_not_found");
    assert_eq!(Error::NothingToCommit.kind(), "precondition_failed");
    assert_eq!(Error::LockFailed(PathBuf::from("lock")).kind(), "operation_failed");
}

#[test]
fn json_error_includes_code_and_details() {
    let err = Error::AmbiguousCommit {
        prefix: "ab".to_string(),
        matches: 3,
    };
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, "reference_not_found");
    assert!(json.error.contains("ambiguous"));
    let details = json.details.expect("details");
    assert_eq!(details["prefix"], "ab");
    assert_eq!(details["matches"], 3);
}

#[test]
fn gitlet_messages_are_preserved() {
    assert_eq!(Error::EmptyMessage.to_string(), "Please enter a commit message.");
    assert_eq!(Error::NothingToCommit.to_string(), "No changes added to the commit.");
    assert_eq!(
        Error::MergeWithSelf.to_string(),
        "Cannot merge a branch with itself."
    );
    assert_eq!(Error::UncommittedChanges.to_string(), "You have uncommitted changes.");
}
