//! External edit step
//!
//! Rebase hands the todo list and reworded commit messages to an [`Editor`].
//! The CLI uses [`ExternalEditor`], which writes the text to a file inside the
//! repository directory, runs the user's editor on it and reads it back.
//! Tests inject a closure instead.

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Editors tried in order when `EDITOR` is unset
const PREFERRED_EDITORS: [&[&str]; 4] = [&["code", "--wait"], &["nano"], &["micro"], &["vim"]];

pub trait Editor {
    /// Let the user edit `content`; returns the result trimmed of surrounding whitespace
    fn edit(&self, file_name: &str, content: &str) -> anyhow::Result<String>;
}

impl<F> Editor for F
where
    F: Fn(&str, &str) -> anyhow::Result<String>,
{
    fn edit(&self, file_name: &str, content: &str) -> anyhow::Result<String> {
        self(file_name, content).map(|edited| edited.trim().to_string())
    }
}

#[derive(Debug)]
pub struct ExternalEditor {
    scratch_dir: Box<Path>,
}

impl ExternalEditor {
    pub fn new(scratch_dir: Box<Path>) -> Self {
        ExternalEditor { scratch_dir }
    }

    /// `EDITOR` split into program and arguments, else the first preferred editor on `PATH`
    pub fn resolve_command() -> anyhow::Result<(String, Vec<String>)> {
        if let Ok(editor) = std::env::var("EDITOR") {
            let mut parts = editor.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                return Ok((program, parts.collect()));
            }
        }

        PREFERRED_EDITORS
            .iter()
            .find(|candidate| Self::is_on_path(candidate[0]))
            .map(|candidate| {
                (
                    candidate[0].to_string(),
                    candidate[1..].iter().map(|arg| arg.to_string()).collect(),
                )
            })
            .ok_or_else(|| {
                anyhow::anyhow!("no suitable editor found (checked code, nano, micro, vim)")
            })
    }

    fn is_on_path(program: &str) -> bool {
        std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
            })
            .unwrap_or(false)
    }

    fn scratch_file(&self, file_name: &str) -> PathBuf {
        self.scratch_dir.join(file_name)
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, file_name: &str, content: &str) -> anyhow::Result<String> {
        let (program, args) = Self::resolve_command()?;
        let path = self.scratch_file(file_name);

        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(editor = %program, file = %path.display(), "opening editor");

        let status = Command::new(&program)
            .args(&args)
            .arg(&path)
            .status()
            .with_context(|| format!("failed to open editor '{}'", program));

        let status = match status {
            Ok(status) => status,
            Err(err) => {
                std::fs::remove_file(&path).ok();
                return Err(err);
            }
        };

        if !status.success() {
            std::fs::remove_file(&path).ok();
            anyhow::bail!("editor '{}' exited with {}", program, status);
        }

        let edited = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        std::fs::remove_file(&path).ok();

        Ok(edited.trim().to_string())
    }
}
