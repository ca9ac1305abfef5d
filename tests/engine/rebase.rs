use crate::common::memory::{MemoryRepository, memory_repository_with_editor};
use kit::artifacts::branch::branch_name::BranchName;
use kit::artifacts::objects::object_id::ObjectId;
use kit::commands::porcelain::reset::ResetMode;
use kit::errors::RepositoryError;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

/// Answers the todo list and commit messages with whatever the test set up
#[derive(Clone, Default)]
struct Script {
    todo: Rc<RefCell<String>>,
    message: Rc<RefCell<Option<String>>>,
}

impl Script {
    fn set_todo(&self, todo: String) {
        *self.todo.borrow_mut() = todo;
    }

    fn set_message(&self, message: &str) {
        *self.message.borrow_mut() = Some(message.to_string());
    }
}

fn scripted_repository() -> (MemoryRepository, Script) {
    let script = Script::default();
    let editor_script = script.clone();

    let repository =
        memory_repository_with_editor(move |file: &str, content: &str| -> anyhow::Result<String> {
            match file {
                "REBASE_TODO" => Ok(editor_script.todo.borrow().clone()),
                _ => Ok(editor_script
                    .message
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| content.to_string())),
            }
        });

    (repository, script)
}

/// base -> c1 -> c2 -> c3, each commit adding one file
fn linear_history(repository: &MemoryRepository) -> (ObjectId, [ObjectId; 3]) {
    repository.write("base.txt", "base");
    let base = repository.commit_all("base");
    repository.write("one.txt", "1");
    let c1 = repository.commit_all("c1");
    repository.write("two.txt", "2");
    let c2 = repository.commit_all("c2");
    repository.write("three.txt", "3");
    let c3 = repository.commit_all("c3");

    (base, [c1, c2, c3])
}

/// base(a=1) -> c1(a=2) -> c2(a=3); dropping c1 makes c2 conflict
fn conflicting_history(repository: &MemoryRepository) -> (ObjectId, ObjectId, ObjectId) {
    repository.write("a.txt", "1");
    let base = repository.commit_all("base");
    repository.write("a.txt", "2");
    let c1 = repository.commit_all("c1");
    repository.write("a.txt", "3");
    let c2 = repository.commit_all("c2");

    (base, c1, c2)
}

fn assert_no_rebase_left(repository: &MemoryRepository) {
    assert!(!repository.is_rebase_in_progress());
    assert_eq!(
        repository.refs().current_branch().unwrap().unwrap().as_ref(),
        "main"
    );
    assert!(
        !repository
            .refs()
            .list_branches()
            .unwrap()
            .iter()
            .any(|branch| branch.as_ref() == "kit-rebase-tmp")
    );
}

fn commits_since(repository: &MemoryRepository, base: &ObjectId) -> usize {
    repository
        .commit_log()
        .ancestors(&repository.head())
        .unwrap()
        .iter()
        .take_while(|(oid, _)| oid != base)
        .count()
}

#[test]
fn pick_drop_pick_replays_only_the_kept_commits() {
    let (repository, script) = scripted_repository();
    let (base, [c1, c2, c3]) = linear_history(&repository);
    script.set_todo(format!("pick {} c1\ndrop {} c2\npick {} c3\n", c1, c2, c3));

    repository.rebase_interactive(base.as_ref()).unwrap();

    assert_eq!(repository.history(), vec!["c3", "c1", "base"]);
    assert_eq!(commits_since(&repository, &base), 2);
    assert!(repository.exists("one.txt"));
    assert!(!repository.exists("two.txt"));
    assert!(repository.exists("three.txt"));
    assert_eq!(repository.load_index().unwrap(), repository.head_tree().unwrap());
    assert_no_rebase_left(&repository);
    assert!(
        repository
            .output
            .contents()
            .contains("Successfully rebased and updated refs/heads/main.")
    );
}

#[test]
fn reword_replaces_the_message_and_keeps_the_tree() {
    let (repository, script) = scripted_repository();
    let (_, [c1, c2, c3]) = linear_history(&repository);
    script.set_todo(format!("pick {}\nreword {}\npick {}", c1, c2, c3));
    script.set_message("c2 reworded");

    repository.rebase_interactive("HEAD~3").unwrap();

    assert_eq!(repository.history(), vec!["c3", "c2 reworded", "c1", "base"]);
    assert_eq!(
        repository.head_tree().unwrap(),
        repository
            .commit_tree(&repository.load_commit(&c3).unwrap())
            .unwrap()
    );
    assert_no_rebase_left(&repository);
}

#[test]
fn squash_folds_a_commit_into_the_previous_one() {
    let (repository, script) = scripted_repository();
    let (base, [c1, c2, c3]) = linear_history(&repository);
    script.set_todo(format!("pick {}\nsquash {}\ndrop {}", c1, c2, c3));

    repository.rebase_interactive(base.as_ref()).unwrap();

    assert_eq!(repository.history(), vec!["c1\n\nc2", "base"]);
    assert!(repository.exists("one.txt"));
    assert!(repository.exists("two.txt"));
    assert!(!repository.exists("three.txt"));
    assert_no_rebase_left(&repository);
}

#[test]
fn conflict_stops_and_continue_commits_the_resolution() {
    let (repository, script) = scripted_repository();
    let (base, c1, c2) = conflicting_history(&repository);
    script.set_todo(format!("drop {} c1\npick {} c2", c1, c2));

    let err = repository.rebase_interactive(base.as_ref()).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::Conflict(_))
    ));
    assert!(repository.is_rebase_in_progress());
    let state = repository.rebase_state().unwrap().unwrap();
    assert_eq!(state.current_step, 1);
    assert_eq!(repository.read("a.txt"), "1");
    let output = repository.output.contents();
    assert!(output.contains(&format!("could not apply pick {} c2", c2)));
    assert!(output.contains("CONFLICT (modified both): a.txt"));
    assert!(output.contains("kit rebase --continue"));

    repository.write("a.txt", "resolved");
    repository.stage(&["a.txt"]);
    repository.rebase_continue().unwrap();

    assert_eq!(repository.history(), vec!["c2", "base"]);
    assert_eq!(repository.read("a.txt"), "resolved");
    assert_no_rebase_left(&repository);
}

#[test]
fn abort_puts_the_branch_back() {
    let (repository, script) = scripted_repository();
    let (base, c1, c2) = conflicting_history(&repository);
    script.set_todo(format!("drop {}\npick {}", c1, c2));

    assert!(repository.rebase_interactive(base.as_ref()).is_err());
    repository.rebase_abort().unwrap();

    assert_eq!(repository.head(), c2);
    assert_eq!(repository.read("a.txt"), "3");
    assert_eq!(repository.load_index().unwrap(), repository.head_tree().unwrap());
    assert_no_rebase_left(&repository);
    assert!(repository.output.contents().contains("Rebase aborted."));
}

#[test]
fn dirty_tree_is_refused() {
    let (repository, script) = scripted_repository();
    let (base, [c1, _, _]) = linear_history(&repository);
    script.set_todo(format!("pick {}", c1));
    repository.write("one.txt", "local edit");

    let err = repository.rebase_interactive(base.as_ref()).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::DirtyWorkingTree(_))
    ));
    assert!(!repository.is_rebase_in_progress());
    assert_eq!(repository.read("one.txt"), "local edit");
}

#[test]
fn base_outside_the_history_is_an_invalid_commit() {
    let (repository, _) = scripted_repository();
    repository.write("a.txt", "1");
    let base = repository.commit_all("base");
    repository.write("a.txt", "2");
    let elsewhere = repository.commit_all("elsewhere");
    repository.reset(base.as_ref(), ResetMode::Hard).unwrap();
    repository.write("b.txt", "b");
    repository.commit_all("here");

    let err = repository.rebase_interactive(elsewhere.as_ref()).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::InvalidCommit(_))
    ));
}

#[test]
fn emptied_todo_list_is_nothing_to_do() {
    let (repository, script) = scripted_repository();
    let (base, _) = linear_history(&repository);
    script.set_todo("# everything removed".to_string());
    let head = repository.head();

    let err = repository.rebase_interactive(base.as_ref()).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::NothingToDo(_))
    ));
    assert_eq!(repository.head(), head);
    assert!(!repository.is_rebase_in_progress());
}

#[test]
fn rebasing_onto_head_has_nothing_to_replay() {
    let (repository, _) = scripted_repository();
    linear_history(&repository);

    repository.rebase_interactive("HEAD").unwrap();

    assert!(repository.output.contents().contains("No commits to rebase."));
    assert!(!repository.is_rebase_in_progress());
}

#[test]
fn continue_without_a_rebase_fails() {
    let (repository, _) = scripted_repository();
    linear_history(&repository);

    let err = repository.rebase_continue().unwrap_err();

    assert_eq!(err.to_string(), "no rebase in progress");
}

#[test]
fn detached_rebase_finishes_detached() {
    let (repository, script) = scripted_repository();
    let (base, [c1, c2, c3]) = linear_history(&repository);
    repository.checkout(c3.as_ref(), false).unwrap();
    script.set_todo(format!("pick {} c1\ndrop {} c2\npick {} c3", c1, c2, c3));

    repository.rebase_interactive(base.as_ref()).unwrap();

    assert_eq!(repository.refs().current_branch().unwrap(), None);
    assert_eq!(repository.history(), vec!["c3", "c1", "base"]);
    assert!(!repository.exists("two.txt"));
    assert!(!repository.is_rebase_in_progress());
    let main = repository
        .refs()
        .read_branch(&BranchName::try_parse("main".to_string()).unwrap())
        .unwrap();
    assert_eq!(main, Some(c3));
    assert!(
        repository
            .output
            .contents()
            .contains("Successfully rebased and updated detached HEAD.")
    );
}

#[test]
fn aborting_a_detached_rebase_resets_to_the_original_commit() {
    let (repository, script) = scripted_repository();
    let (base, c1, c2) = conflicting_history(&repository);
    repository.checkout(c2.as_ref(), false).unwrap();
    script.set_todo(format!("drop {}\npick {}", c1, c2));

    assert!(repository.rebase_interactive(base.as_ref()).is_err());
    assert_eq!(repository.read("a.txt"), "1");

    repository.rebase_abort().unwrap();

    assert_eq!(repository.refs().current_branch().unwrap(), None);
    assert_eq!(repository.head(), c2);
    assert_eq!(repository.read("a.txt"), "3");
    assert_eq!(repository.load_index().unwrap(), repository.head_tree().unwrap());
    assert!(!repository.is_rebase_in_progress());
    assert!(
        !repository
            .refs()
            .list_branches()
            .unwrap()
            .iter()
            .any(|branch| branch.as_ref() == "kit-rebase-tmp")
    );
}

#[test]
fn continue_folds_a_resolved_squash_into_the_previous_commit() {
    let (repository, script) = scripted_repository();
    repository.write("a.txt", "1");
    let base = repository.commit_all("base");
    repository.write("b.txt", "b");
    let c1 = repository.commit_all("c1");
    repository.write("a.txt", "2");
    let c2 = repository.commit_all("c2");
    repository.write("a.txt", "3");
    let c3 = repository.commit_all("c3");
    script.set_todo(format!("pick {}\ndrop {}\nsquash {}", c1, c2, c3));

    let err = repository.rebase_interactive(base.as_ref()).unwrap_err();

    assert!(matches!(
        RepositoryError::kind_of(&err),
        Some(RepositoryError::Conflict(_))
    ));
    assert_eq!(repository.rebase_state().unwrap().unwrap().current_step, 2);

    repository.write("a.txt", "resolved");
    repository.stage(&["a.txt"]);
    repository.rebase_continue().unwrap();

    assert_eq!(repository.history(), vec!["c1\n\nc3", "base"]);
    assert_eq!(repository.read("a.txt"), "resolved");
    assert_eq!(repository.read("b.txt"), "b");
    assert_eq!(repository.load_index().unwrap(), repository.head_tree().unwrap());
    assert_no_rebase_left(&repository);
}
