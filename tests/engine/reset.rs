use crate::common::memory::memory_repository;
use kit::artifacts::objects::commit::{Author, Commit};
use kit::artifacts::objects::object_id::ObjectId;
use kit::commands::porcelain::reset::ResetMode;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

#[test]
fn soft_reset_moves_head_and_keeps_index_and_workspace() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let first = repository.commit_all("first");
    repository.write("a.txt", "two");
    repository.commit_all("second");
    let staged = repository.load_index().unwrap();

    repository.reset(first.as_ref(), ResetMode::Soft).unwrap();

    assert_eq!(repository.head(), first);
    assert_eq!(repository.load_index().unwrap(), staged);
    assert_eq!(repository.read("a.txt"), "two");
}

#[test]
fn mixed_reset_replaces_index_but_not_workspace() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let first = repository.commit_all("first");
    repository.write("b.txt", "new");
    repository.commit_all("second");

    repository.reset("HEAD^", ResetMode::Mixed).unwrap();

    assert_eq!(repository.head(), first);
    assert_eq!(
        repository.load_index().unwrap().keys().cloned().collect::<Vec<_>>(),
        vec![PathBuf::from("a.txt")]
    );
    assert!(repository.exists("b.txt"));
}

#[test]
fn hard_reset_removes_files_that_the_target_does_not_track() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let first = repository.commit_all("first");
    repository.write("a.txt", "changed");
    repository.write("b.txt", "new");
    repository.commit_all("second");

    repository.reset(first.as_ref(), ResetMode::Hard).unwrap();

    assert_eq!(repository.head(), first);
    assert_eq!(repository.read("a.txt"), "one");
    assert!(!repository.exists("b.txt"));
    assert!(repository.output.contents().contains("HEAD is now at"));
}

#[test]
fn failed_mixed_reset_restores_head() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let head = repository.commit_all("first");

    // a commit whose tree was never stored makes the index step fail
    let missing_tree = ObjectId::try_parse("f".repeat(40)).unwrap();
    let broken = Commit::new(
        Some(head.clone()),
        missing_tree,
        Author::new("Tester".to_string(), "tester@example.com".to_string()),
        "broken".to_string(),
    );
    let broken_id = repository.commit_log().append(&broken).unwrap();

    let result = repository.reset_to(&broken_id, ResetMode::Mixed);

    assert!(result.is_err());
    assert_eq!(repository.head(), head);
    assert_eq!(
        repository.refs().current_branch().unwrap().unwrap().as_ref(),
        "main"
    );
}

#[test]
fn failed_hard_reset_restores_a_detached_head() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let head = repository.commit_all("first");
    repository.refs().detach_head(&head).unwrap();

    let missing_tree = ObjectId::try_parse("e".repeat(40)).unwrap();
    let broken = Commit::new(
        Some(head.clone()),
        missing_tree,
        Author::new("Tester".to_string(), "tester@example.com".to_string()),
        "broken".to_string(),
    );
    let broken_id = repository.commit_log().append(&broken).unwrap();

    assert!(repository.reset_to(&broken_id, ResetMode::Hard).is_err());
    assert_eq!(repository.head(), head);
    assert!(repository.refs().current_ref().unwrap().is_detached_head());
    assert_eq!(repository.read("a.txt"), "one");
}
