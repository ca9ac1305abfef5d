use crate::common::memory::memory_repository;
use kit::errors::RepositoryError;
use pretty_assertions::assert_eq;

#[test]
fn switching_branches_rewrites_the_working_tree() {
    let repository = memory_repository();
    repository.write("shared.txt", "base");
    repository.commit_all("base");
    repository.branch("feature", None).unwrap();

    repository.write("shared.txt", "main change");
    repository.write("main-only.txt", "main");
    repository.commit_all("main work");

    repository.checkout("feature", false).unwrap();

    assert_eq!(repository.read("shared.txt"), "base");
    assert!(!repository.exists("main-only.txt"));
    assert_eq!(
        repository.refs().current_branch().unwrap().unwrap().as_ref(),
        "feature"
    );
    assert_eq!(repository.load_index().unwrap(), repository.head_tree().unwrap());

    repository.checkout("main", false).unwrap();

    assert_eq!(repository.read("shared.txt"), "main change");
    assert_eq!(repository.read("main-only.txt"), "main");
}

#[test]
fn checking_out_a_commit_detaches_head() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let first = repository.commit_all("first");
    repository.write("a.txt", "two");
    repository.commit_all("second");

    repository.checkout(&first.to_short_oid(), false).unwrap();

    assert!(repository.refs().current_ref().unwrap().is_detached_head());
    assert_eq!(repository.head(), first);
    assert_eq!(repository.read("a.txt"), "one");
}

#[test]
fn dirty_tree_blocks_checkout() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");
    repository.branch("other", None).unwrap();
    repository.write("a.txt", "uncommitted");

    let err = repository.checkout("other", false).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::DirtyWorkingTree(_))
    ));
    assert_eq!(repository.read("a.txt"), "uncommitted");
}

#[test]
fn unknown_target_is_an_invalid_commit() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");

    let err = repository.checkout("no-such-branch", false).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::InvalidCommit(_))
    ));
}
