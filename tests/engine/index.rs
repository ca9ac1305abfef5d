use crate::common::memory::memory_repository;
use kit::areas::storage::Storage;
use kit::artifacts::objects::object_id::ObjectId;
use kit::errors::RepositoryError;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

#[test]
fn failing_mutation_leaves_the_index_file_untouched() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.write("b.txt", "two");
    repository.stage(&["a.txt", "b.txt"]);
    let before = repository.storage.read(&repository.index_path()).unwrap();

    let result: anyhow::Result<()> = repository.update_index(|index| {
        index.remove(&PathBuf::from("a.txt"));
        index.add(PathBuf::from("c.txt"), ObjectId::try_parse("a".repeat(40))?);
        anyhow::bail!("mutation failed halfway")
    });

    assert!(result.is_err());
    assert_eq!(repository.storage.read(&repository.index_path()).unwrap(), before);
    assert_eq!(repository.load_index().unwrap().len(), 2);
}

#[test]
fn unknown_pathspec_fails_without_staging_anything() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let before = repository.storage.read(&repository.index_path()).unwrap();

    let err = repository
        .add(&["a.txt".to_string(), "missing.txt".to_string()])
        .unwrap_err();

    assert_eq!(err.to_string(), "pathspec 'missing.txt' did not match any files");
    assert_eq!(repository.storage.read(&repository.index_path()).unwrap(), before);
}

#[test]
fn adding_a_deleted_tracked_file_unstages_it() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.write("dir/b.txt", "two");
    repository.commit_all("first");

    repository.workspace().remove_file(&PathBuf::from("dir/b.txt")).unwrap();
    repository.stage(&["dir"]);

    assert_eq!(
        repository.load_index().unwrap().keys().cloned().collect::<Vec<_>>(),
        vec![PathBuf::from("a.txt")]
    );
}

#[test]
fn paths_outside_the_repository_are_rejected() {
    let repository = memory_repository();

    let err = repository.add(&["../outside.txt".to_string()]).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::UnsafePath(_))
    ));
}

#[test]
fn rm_removes_from_disk_and_index() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    repository.write("dir/b.txt", "two");
    repository.write("dir/c.txt", "three");
    repository.commit_all("first");

    assert!(repository.rm(&["dir".to_string()], false).is_err());
    repository.rm(&["dir".to_string()], true).unwrap();

    assert!(!repository.exists("dir/b.txt"));
    assert!(!repository.exists("dir/c.txt"));
    assert_eq!(
        repository.load_index().unwrap().keys().cloned().collect::<Vec<_>>(),
        vec![PathBuf::from("a.txt")]
    );
    assert!(repository.output.contents().contains("rm 'dir/b.txt'"));
}

#[test]
fn commit_refuses_an_unchanged_tree_and_amend_keeps_the_parent() {
    let repository = memory_repository();
    repository.write("a.txt", "one");
    let first = repository.commit_all("first");
    repository.write("a.txt", "two");
    repository.commit_all("second");

    let err = repository.commit("again", false).unwrap_err();
    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::NothingToDo(_))
    ));

    let amended = repository.commit("second, amended", true).unwrap();

    let amended_commit = repository.load_commit(&amended).unwrap();
    assert_eq!(amended_commit.parent(), Some(&first));
    assert_eq!(repository.history(), vec!["second, amended", "first"]);
}
