//! Workspace synchronization
//!
//! Makes the working tree match a target tree. This is the single routine
//! behind checkout, hard reset, stash apply/pop and the rebase base checkout.
//!
//! ## Plan
//!
//! Every path of the previously tracked mapping that is absent from the target
//! is deleted; every path of the target is written, whether or not its blob
//! changed. All target blobs are loaded before the first file is touched, so a
//! missing or corrupt object aborts the sync with the working tree intact.
//!
//! Paths that would escape the working tree are rejected during planning.
//!
//! ## Order
//!
//! Deletions run first (pruning directories they empty), then modifications,
//! then additions. A failure halfway through the writes leaves a mixed tree;
//! the index is only replaced by the caller once the workspace is updated.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Type of file system action required for the sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    /// Delete a file tracked before but absent from the target
    Delete,
    /// Rewrite a file tracked before and present in the target
    Modify,
    /// Create a file only present in the target
    Add,
}

/// Planned actions grouped by type, in application order
pub type ActionsSet = BTreeMap<ActionType, Vec<(PathBuf, Option<ObjectId>)>>;

pub struct Migration<'r> {
    repository: &'r Repository,
    previous: &'r TreeEntries,
    target: &'r TreeEntries,
    actions: ActionsSet,
    blobs: HashMap<ObjectId, Bytes>,
}

impl<'r> Migration<'r> {
    pub fn new(
        repository: &'r Repository,
        previous: &'r TreeEntries,
        target: &'r TreeEntries,
    ) -> Self {
        Self {
            repository,
            previous,
            target,
            actions: ActionsSet::new(),
            blobs: HashMap::new(),
        }
    }

    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;
        self.update_workspace()
    }

    fn plan_changes(&mut self) -> anyhow::Result<()> {
        self.actions.clear();
        let workspace = self.repository.workspace();

        for path in self.previous.keys().chain(self.target.keys()) {
            if !workspace.is_safe_path(path) {
                return Err(RepositoryError::UnsafePath(path.clone()).into());
            }
        }

        for path in self.previous.keys() {
            if !self.target.contains_key(path) {
                self.record(ActionType::Delete, path.clone(), None);
            }
        }

        for (path, oid) in self.target {
            let action = if self.previous.contains_key(path) {
                ActionType::Modify
            } else {
                ActionType::Add
            };
            self.record(action, path.clone(), Some(oid.clone()));

            if !self.blobs.contains_key(oid) {
                let blob = self
                    .repository
                    .database()
                    .parse_blob(oid)
                    .with_context(|| format!("failed to load blob for {}", path.display()))?;
                self.blobs.insert(oid.clone(), blob.into_content());
            }
        }

        tracing::debug!(
            deletions = self.count(ActionType::Delete),
            modifications = self.count(ActionType::Modify),
            additions = self.count(ActionType::Add),
            "planned workspace sync"
        );

        Ok(())
    }

    fn record(&mut self, action: ActionType, path: PathBuf, oid: Option<ObjectId>) {
        self.actions.entry(action).or_default().push((path, oid));
    }

    fn count(&self, action: ActionType) -> usize {
        self.actions.get(&action).map_or(0, Vec::len)
    }

    fn update_workspace(&self) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();

        for (action, entries) in &self.actions {
            for (path, oid) in entries {
                match (action, oid) {
                    (ActionType::Delete, _) => workspace.remove_file(path)?,
                    (ActionType::Add | ActionType::Modify, Some(oid)) => {
                        let data = self
                            .blobs
                            .get(oid)
                            .with_context(|| format!("blob {} was not loaded", oid))?;
                        // a directory may stand where the file goes
                        if workspace.exists(path) && !workspace.is_file(path) {
                            for nested in workspace.list_files(Some(path))? {
                                workspace.remove_file(&nested)?;
                            }
                        }
                        workspace.write_file(path, data)?;
                    }
                    (ActionType::Add | ActionType::Modify, None) => {
                        anyhow::bail!("no blob recorded for {}", path.display())
                    }
                }
            }
        }

        Ok(())
    }
}
