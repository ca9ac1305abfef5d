use crate::artifacts::status::{IndexChangeType, WorkspaceChangeType};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FileChange {
    pub index_change: IndexChangeType,
    pub workspace_change: WorkspaceChangeType,
}

impl std::fmt::Display for FileChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.index_change.short_code(),
            self.workspace_change.short_code()
        )
    }
}

/// Staged, unstaged and untracked changes, keyed by workspace-relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub changed_files: BTreeMap<PathBuf, FileChange>,
    pub untracked_files: BTreeSet<PathBuf>,
}

impl StatusInfo {
    pub fn index_changes(&self) -> impl Iterator<Item = (&PathBuf, IndexChangeType)> {
        self.changed_files
            .iter()
            .filter(|(_, change)| change.index_change != IndexChangeType::None)
            .map(|(path, change)| (path, change.index_change))
    }

    pub fn workspace_changes(&self) -> impl Iterator<Item = (&PathBuf, WorkspaceChangeType)> {
        self.changed_files
            .iter()
            .filter(|(_, change)| change.workspace_change != WorkspaceChangeType::None)
            .map(|(path, change)| (path, change.workspace_change))
    }

    pub fn has_staged_changes(&self) -> bool {
        self.index_changes().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.changed_files.is_empty() && self.untracked_files.is_empty()
    }
}
