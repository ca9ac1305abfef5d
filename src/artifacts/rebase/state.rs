//! Persisted rebase state
//!
//! The state file exists exactly while a rebase is in progress; there is no
//! other flag. It is rewritten after every completed step so an interrupted
//! rebase resumes from the step that stopped it.

use crate::areas::storage::Storage;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const REBASE_STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebaseState {
    pub version: u32,
    /// Branch being rebased; `None` when HEAD was detached
    pub head_name: Option<String>,
    pub onto: ObjectId,
    pub orig_head: ObjectId,
    pub todo_steps: Vec<String>,
    pub current_step: usize,
}

impl RebaseState {
    pub fn new(
        head_name: Option<&BranchName>,
        onto: ObjectId,
        orig_head: ObjectId,
        todo_steps: Vec<String>,
    ) -> Self {
        RebaseState {
            version: REBASE_STATE_VERSION,
            head_name: head_name.map(ToString::to_string),
            onto,
            orig_head,
            todo_steps,
            current_step: 0,
        }
    }

    pub fn exists(storage: &dyn Storage, path: &Path) -> bool {
        storage.is_file(path)
    }

    pub fn load(storage: &dyn Storage, path: &Path) -> anyhow::Result<Option<Self>> {
        if !storage.is_file(path) {
            return Ok(None);
        }

        let content = storage.read(path).map_err(|err| {
            RepositoryError::io(
                format!("unable to read rebase state {}", path.display()),
                err,
            )
        })?;
        let state: RebaseState = serde_json::from_slice(&content)
            .with_context(|| format!("corrupt rebase state {}", path.display()))?;

        if state.version != REBASE_STATE_VERSION {
            anyhow::bail!(
                "unsupported rebase state version {} in {}",
                state.version,
                path.display()
            );
        }

        Ok(Some(state))
    }

    pub fn save(&self, storage: &dyn Storage, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_vec_pretty(self).context("unable to serialize rebase state")?;

        storage.write(path, &content).map_err(|err| {
            RepositoryError::io(
                format!("unable to write rebase state {}", path.display()),
                err,
            )
            .into()
        })
    }

    pub fn clear(storage: &dyn Storage, path: &Path) -> anyhow::Result<()> {
        match storage.remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(RepositoryError::io(
                format!("unable to remove rebase state {}", path.display()),
                err,
            )
            .into()),
        }
    }

    pub fn branch_name(&self) -> anyhow::Result<Option<BranchName>> {
        self.head_name
            .as_ref()
            .map(|name| BranchName::try_parse(name.clone()))
            .transpose()
    }

    pub fn current_line(&self) -> Option<&str> {
        self.todo_steps.get(self.current_step).map(String::as_str)
    }

    pub fn total_steps(&self) -> usize {
        self.todo_steps.len()
    }

    pub fn advance(&mut self) {
        self.current_step += 1;
    }
}
