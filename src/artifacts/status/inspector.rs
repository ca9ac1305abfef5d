use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use crate::artifacts::status::status_info::{FileChange, StatusInfo};
use crate::artifacts::status::{IndexChangeType, WorkspaceChangeType};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Compares the working tree, the index and HEAD
///
/// Untracked files only show up in [`Inspector::status`]; they never make the tree dirty.
pub struct Inspector<'r> {
    repository: &'r Repository,
}

impl<'r> Inspector<'r> {
    pub fn new(repository: &'r Repository) -> Self {
        Inspector { repository }
    }

    /// Hash the file on disk without storing it
    pub fn workspace_oid(&self, path: &Path) -> anyhow::Result<ObjectId> {
        self.repository.workspace().parse_blob(path)?.object_id()
    }

    pub fn check_index_against_workspace(
        &self,
        path: &Path,
        index_oid: &ObjectId,
    ) -> anyhow::Result<WorkspaceChangeType> {
        if !self.repository.workspace().is_file(path) {
            return Ok(WorkspaceChangeType::Deleted);
        }

        if &self.workspace_oid(path)? != index_oid {
            Ok(WorkspaceChangeType::Modified)
        } else {
            Ok(WorkspaceChangeType::None)
        }
    }

    /// Tracked paths whose working copy differs from the index
    pub fn workspace_changes(
        &self,
        index: &TreeEntries,
    ) -> anyhow::Result<Vec<(PathBuf, WorkspaceChangeType)>> {
        let mut changes = Vec::new();

        for (path, oid) in index {
            let change = self.check_index_against_workspace(path, oid)?;
            if change != WorkspaceChangeType::None {
                changes.push((path.clone(), change));
            }
        }

        Ok(changes)
    }

    /// How each index entry differs from HEAD, plus HEAD paths missing from the index
    pub fn index_changes(
        index: &TreeEntries,
        head: &TreeEntries,
    ) -> Vec<(PathBuf, IndexChangeType)> {
        let mut changes = index
            .iter()
            .filter_map(|(path, oid)| match head.get(path) {
                None => Some((path.clone(), IndexChangeType::Added)),
                Some(head_oid) if head_oid != oid => Some((path.clone(), IndexChangeType::Modified)),
                Some(_) => None,
            })
            .collect::<Vec<_>>();

        changes.extend(
            head.keys()
                .filter(|path| !index.contains_key(*path))
                .map(|path| (path.clone(), IndexChangeType::Deleted)),
        );
        changes.sort();

        changes
    }

    /// Files on disk the index does not track
    pub fn untracked_files(&self, index: &TreeEntries) -> anyhow::Result<BTreeSet<PathBuf>> {
        Ok(self
            .repository
            .workspace()
            .list_files(None)?
            .into_iter()
            .filter(|path| !index.contains_key(path))
            .collect())
    }

    pub fn status(&self) -> anyhow::Result<StatusInfo> {
        let index = self.repository.load_index()?;
        let head = self.repository.head_tree()?;

        let mut changed_files = BTreeMap::<PathBuf, FileChange>::new();
        for (path, change) in Self::index_changes(&index, &head) {
            changed_files.entry(path).or_default().index_change = change;
        }
        for (path, change) in self.workspace_changes(&index)? {
            changed_files.entry(path).or_default().workspace_change = change;
        }

        Ok(StatusInfo {
            changed_files,
            untracked_files: self.untracked_files(&index)?,
        })
    }

    /// Staged changes (index vs HEAD) or unstaged changes to tracked files
    pub fn is_workspace_dirty(&self) -> anyhow::Result<bool> {
        let index = self.repository.load_index()?;

        if index != self.repository.head_tree()? {
            return Ok(true);
        }

        Ok(!self.workspace_changes(&index)?.is_empty())
    }
}
