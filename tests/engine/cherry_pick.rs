use crate::common::memory::memory_repository;
use kit::artifacts::rebase::cherry_pick::ConflictKind;
use kit::commands::porcelain::reset::ResetMode;
use kit::errors::RepositoryError;
use pretty_assertions::{assert_eq, assert_ne};
use std::path::PathBuf;

#[test]
fn diverging_modification_conflicts_and_leaves_the_path_alone() {
    let repository = memory_repository();
    repository.write("a.txt", "1");
    let base = repository.commit_all("base");
    repository.write("a.txt", "2");
    let child = repository.commit_all("child");

    // HEAD moves to a sibling of the child that holds a third version
    repository.reset(base.as_ref(), ResetMode::Hard).unwrap();
    repository.write("a.txt", "3");
    let head = repository.commit_all("sibling");

    let child_commit = repository.load_commit(&child).unwrap();
    let err = repository.cherry_pick(&child_commit, false).unwrap_err();

    match RepositoryError::kind_of(&err) {
        Some(RepositoryError::Conflict(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].path, PathBuf::from("a.txt"));
            assert_eq!(conflicts[0].kind, ConflictKind::ModifiedBoth);
        }
        other => panic!("expected a conflict, got {:?}", other),
    }
    assert_eq!(repository.read("a.txt"), "3");
    assert_eq!(repository.head(), head);
}

#[test]
fn every_conflicting_path_is_reported_and_nothing_is_applied() {
    let repository = memory_repository();
    repository.write("a.txt", "1");
    repository.write("b.txt", "1");
    let base = repository.commit_all("base");
    repository.write("a.txt", "2");
    repository.write("b.txt", "2");
    repository.write("c.txt", "new");
    let child = repository.commit_all("child");

    repository.reset(base.as_ref(), ResetMode::Hard).unwrap();
    repository.write("a.txt", "3");
    repository.write("b.txt", "3");
    repository.commit_all("sibling");

    let child_commit = repository.load_commit(&child).unwrap();
    let err = repository.cherry_pick(&child_commit, false).unwrap_err();

    match RepositoryError::kind_of(&err) {
        Some(RepositoryError::Conflict(conflicts)) => {
            let paths = conflicts.iter().map(|c| c.path.clone()).collect::<Vec<_>>();
            assert_eq!(paths, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        }
        other => panic!("expected a conflict, got {:?}", other),
    }
    assert!(!repository.exists("c.txt"));
}

#[test]
fn clean_pick_applies_changes_and_keeps_the_original_message() {
    let repository = memory_repository();
    repository.write("a.txt", "1");
    let base = repository.commit_all("base");
    repository.write("b.txt", "added");
    let child = repository.commit_all("add b");

    repository.reset(base.as_ref(), ResetMode::Hard).unwrap();
    repository.write("c.txt", "other");
    let head = repository.commit_all("add c");

    let child_commit = repository.load_commit(&child).unwrap();
    let picked = repository
        .cherry_pick(&child_commit, false)
        .unwrap()
        .expect("a commit is created");

    let picked_commit = repository.load_commit(&picked).unwrap();
    assert_eq!(picked_commit.parent(), Some(&head));
    assert_eq!(picked_commit.message(), "add b");
    assert_eq!(repository.head(), picked);
    assert_eq!(repository.read("b.txt"), "added");
    assert_eq!(repository.read("c.txt"), "other");
}

#[test]
fn no_commit_pick_only_stages_the_change() {
    let repository = memory_repository();
    repository.write("a.txt", "1");
    let base = repository.commit_all("base");
    repository.write("a.txt", "2");
    let child = repository.commit_all("child");
    repository.reset(base.as_ref(), ResetMode::Hard).unwrap();

    let child_commit = repository.load_commit(&child).unwrap();
    let picked = repository.cherry_pick(&child_commit, true).unwrap();

    assert_eq!(picked, None);
    assert_eq!(repository.head(), base);
    assert_eq!(repository.read("a.txt"), "2");
    assert_ne!(repository.load_index().unwrap(), repository.head_tree().unwrap());
}
