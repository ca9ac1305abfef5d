use crate::common::memory::memory_repository;
use kit::errors::RepositoryError;
use pretty_assertions::assert_eq;

fn error_kind(result: anyhow::Result<impl std::fmt::Debug>) -> String {
    let err = result.expect_err("operation should fail");
    match RepositoryError::kind_of(&err) {
        Some(kind) => format!("{:?}", kind),
        None => panic!("untyped error: {:#}", err),
    }
}

#[test]
fn push_without_commits_fails() {
    let repository = memory_repository();
    repository.write("a.txt", "one");

    let err = repository.stash_push(None).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::NoCommitsYet)
    ));
    assert_eq!(err.to_string(), "no commits yet");
}

#[test]
fn push_on_a_clean_tree_fails() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");

    let err = repository.stash_push(None).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::NothingToDo(_))
    ));
    assert!(err.to_string().contains("nothing to stash"));
}

#[test]
fn push_then_pop_restores_a_staged_change() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.write("b.txt", "untouched");
    let head = repository.commit_all("first");

    repository.write("a.txt", "work in progress");
    repository.stage(&["a.txt"]);
    let index_before = repository.load_index().unwrap();

    repository.stash_push(Some("halfway")).unwrap();

    assert_eq!(repository.read("a.txt"), "one");
    assert_eq!(repository.load_index().unwrap(), repository.head_tree().unwrap());
    assert_eq!(repository.head(), head);
    assert_eq!(
        repository.stash_entries().unwrap(),
        vec![(0, "WIP on main: halfway".to_string())]
    );

    repository.stash_pop().unwrap();

    assert_eq!(repository.read("a.txt"), "work in progress");
    assert_eq!(repository.read("b.txt"), "untouched");
    assert_eq!(repository.load_index().unwrap(), index_before);
    assert!(repository.stash_entries().unwrap().is_empty());
    assert_eq!(repository.head(), head);
}

#[test]
fn push_captures_unstaged_modifications_of_tracked_files() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");
    repository.write("a.txt", "edited but not staged");

    repository.stash_push(None).unwrap();
    assert_eq!(repository.read("a.txt"), "one");
    assert_eq!(
        repository.stash_entries().unwrap(),
        vec![(0, "WIP on main: first".to_string())]
    );

    repository.stash_apply(0).unwrap();

    assert_eq!(repository.read("a.txt"), "edited but not staged");
    assert_eq!(repository.stash_entries().unwrap().len(), 1);
}

#[test]
fn drop_zero_shifts_the_older_entry_to_the_top() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");

    repository.write("a.txt", "older");
    let older = repository.stash_push(Some("older")).unwrap();
    repository.write("a.txt", "newer");
    repository.stash_push(Some("newer")).unwrap();

    repository.stash_drop(0).unwrap();

    assert_eq!(repository.refs().read_stash().unwrap(), vec![older]);
    assert_eq!(
        repository.stash_entries().unwrap(),
        vec![(0, "WIP on main: older".to_string())]
    );
}

#[test]
fn pop_and_drop_on_an_empty_stack_fail() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");

    assert_eq!(error_kind(repository.stash_pop()), "NoStashEntries");
    assert_eq!(error_kind(repository.stash_drop(0)), "NoStashEntries");
    assert_eq!(error_kind(repository.stash_apply(0)), "NoStashEntries");
}

#[test]
fn out_of_range_index_is_rejected() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");
    repository.write("a.txt", "two");
    repository.stash_push(None).unwrap();

    assert_eq!(error_kind(repository.stash_drop(3)), "InvalidStashIndex(3)");
    assert_eq!(repository.stash_entries().unwrap().len(), 1);
}

#[test]
fn pop_refuses_a_dirty_tree_and_keeps_the_entry() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");
    repository.write("a.txt", "stashed");
    repository.stash_push(None).unwrap();

    repository.write("a.txt", "new local edit");

    assert_eq!(
        error_kind(repository.stash_pop()),
        format!(
            "{:?}",
            RepositoryError::DirtyWorkingTree(
                "your local changes would be overwritten by stash pop; commit or stash them first"
                    .to_string()
            )
        )
    );
    assert_eq!(repository.read("a.txt"), "new local edit");
    assert_eq!(repository.stash_entries().unwrap().len(), 1);
}

#[test]
fn clear_empties_the_stack() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first");
    repository.write("a.txt", "two");
    repository.stash_push(None).unwrap();

    repository.stash_clear().unwrap();

    assert!(repository.stash_entries().unwrap().is_empty());
}

#[test]
fn apply_restores_an_older_entry_and_keeps_the_stack() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let head = repository.commit_all("first");

    repository.write("a.txt", "older");
    let older = repository.stash_push(Some("older")).unwrap();
    repository.write("a.txt", "newer");
    let newer = repository.stash_push(Some("newer")).unwrap();

    repository.stash_apply(1).unwrap();

    assert_eq!(repository.read("a.txt"), "older");
    assert_eq!(repository.head(), head);
    assert_eq!(repository.refs().read_stash().unwrap(), vec![newer, older.clone()]);
    assert!(
        repository
            .output
            .contents()
            .contains(&format!("Applied refs/stash@{{1}} ({})", older.to_short_oid()))
    );
}

#[test]
fn default_message_carries_the_whole_head_message() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.commit_all("first\n\nwith a body");
    repository.write("a.txt", "two");

    repository.stash_push(None).unwrap();

    assert_eq!(
        repository.stash_entries().unwrap(),
        vec![(0, "WIP on main: first\n\nwith a body".to_string())]
    );
}
