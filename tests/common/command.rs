use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let file1 = FileSpec::new(repository_dir.path().join("1.txt"), "one".to_string());
    write_file(file1);

    let file2 = FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    );
    write_file(file2);

    let file3 = FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    );
    write_file(file3);

    run_kit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    kit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

#[fixture]
pub fn repository_with_multiple_commits(repository_dir: TempDir) -> TempDir {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    for (index, message) in ["First commit", "Second commit", "Third commit", "Fourth commit"]
        .iter()
        .enumerate()
    {
        let file = FileSpec::new(
            repository_dir.path().join(format!("file{}.txt", index + 1)),
            format!("content {}", index + 1),
        );
        write_file(file);

        run_kit_command(repository_dir.path(), &["add", "."])
            .assert()
            .success();
        kit_commit(repository_dir.path(), message)
            .assert()
            .success();
    }

    repository_dir
}

pub fn run_kit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("kit").expect("Failed to find kit binary");
    cmd.envs(vec![("NO_COLOR", "1"), ("EDITOR", "true")]);
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn kit_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_kit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", "fake_user"),
        ("GIT_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd
}

/// Get the current HEAD commit id, following a symbolic HEAD
pub fn get_head_commit_sha(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let head_path = dir.join(".kit").join("HEAD");
    let head_content = std::fs::read_to_string(head_path)?;

    // HEAD file contains either a commit id or a ref like "ref: refs/heads/main"
    if let Some(ref_path) = head_content.strip_prefix("ref: ") {
        let ref_file = dir.join(".kit").join(ref_path.trim());
        let commit_sha = std::fs::read_to_string(ref_file)?;
        Ok(commit_sha.trim().to_string())
    } else {
        Ok(head_content.trim().to_string())
    }
}

pub fn read_branch(dir: &Path, branch: &str) -> Result<String, Box<dyn std::error::Error>> {
    let ref_file = dir.join(".kit").join("refs").join("heads").join(branch);

    Ok(std::fs::read_to_string(ref_file)?.trim().to_string())
}

/// Get the parent commit id of a given commit by using kit cat-file
pub fn get_parent_commit_id(
    dir: &Path,
    commit_id: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_kit_command(dir, &["cat-file", commit_id]).output()?;

    let stdout = String::from_utf8(output.stdout)?;

    for line in stdout.lines() {
        if let Some(oid) = line.strip_prefix("parent ") {
            return Ok(oid.to_string());
        }
    }

    Err("No parent found".into())
}

/// Get the message of a commit (everything after the first blank line)
pub fn get_commit_message(
    dir: &Path,
    commit_id: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_kit_command(dir, &["cat-file", commit_id]).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    stdout
        .split_once("\n\n")
        .map(|(_, message)| message.trim().to_string())
        .ok_or_else(|| "No message found".into())
}

/// Messages from HEAD back to the root commit, newest first
pub fn history_messages(dir: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut messages = Vec::new();
    let mut current = Some(get_head_commit_sha(dir)?);

    while let Some(commit_id) = current {
        messages.push(get_commit_message(dir, &commit_id)?);
        current = get_parent_commit_id(dir, &commit_id).ok();
    }

    Ok(messages)
}
