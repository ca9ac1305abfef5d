use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::inspector::Inspector;
use crate::commands::porcelain::reset::ResetMode;
use crate::errors::RepositoryError;
use std::io::Write;

const DETACHED_MARKER: &str = "detached HEAD";

impl Repository {
    /// Snapshot the tracked changes as a commit on the stash stack and reset to HEAD
    pub fn stash_push(&self, message: Option<&str>) -> anyhow::Result<ObjectId> {
        self.require_repository()?;

        let (head_oid, head_commit) = self.head_commit()?.ok_or(RepositoryError::NoCommitsYet)?;
        if !Inspector::new(self).is_workspace_dirty()? {
            return Err(RepositoryError::NothingToDo(
                "nothing to stash, working tree clean".to_string(),
            )
            .into());
        }

        self.stage_tracked_changes()?;

        let branch = self.refs().current_branch_or(DETACHED_MARKER);
        let wip_message = match message.map(str::trim).filter(|message| !message.is_empty()) {
            Some(message) => format!("WIP on {}: {}", branch, message),
            None => format!("WIP on {}: {}", branch, head_commit.message()),
        };

        let (stash_oid, _) =
            self.write_commit(Some(head_oid.clone()), self.author(), wip_message.clone())?;

        let mut stack = self.refs().read_stash()?;
        stack.insert(0, stash_oid.clone());
        self.refs().write_stash(&stack)?;

        self.reset_to(&head_oid, ResetMode::Hard)?;

        writeln!(
            self.writer(),
            "Saved working directory and index state {}",
            wip_message
        )?;

        Ok(stash_oid)
    }

    pub fn stash_pop(&self) -> anyhow::Result<()> {
        self.require_repository()?;

        let stash_oid = self.apply_stash_entry(0, "pop")?;

        let mut stack = self.refs().read_stash()?;
        stack.remove(0);
        self.refs().write_stash(&stack)?;

        writeln!(
            self.writer(),
            "On branch {}",
            self.refs().current_branch_or(DETACHED_MARKER)
        )?;
        writeln!(
            self.writer(),
            "Dropped refs/stash@{{0}} ({})",
            stash_oid.to_short_oid()
        )?;

        Ok(())
    }

    pub fn stash_apply(&self, index: usize) -> anyhow::Result<()> {
        self.require_repository()?;

        let stash_oid = self.apply_stash_entry(index, "apply")?;

        writeln!(
            self.writer(),
            "Applied refs/stash@{{{}}} ({})",
            index,
            stash_oid.to_short_oid()
        )?;

        Ok(())
    }

    pub fn stash_drop(&self, index: usize) -> anyhow::Result<()> {
        self.require_repository()?;

        let mut stack = self.refs().read_stash()?;
        let stash_oid = Self::stash_entry(&stack, index)?;
        stack.remove(index);
        self.refs().write_stash(&stack)?;

        writeln!(
            self.writer(),
            "Dropped refs/stash@{{{}}} ({})",
            index,
            stash_oid.to_short_oid()
        )?;

        Ok(())
    }

    /// Stash entries newest first, as `(position, message)`
    pub fn stash_entries(&self) -> anyhow::Result<Vec<(usize, String)>> {
        self.require_repository()?;

        self.refs()
            .read_stash()?
            .iter()
            .enumerate()
            .map(|(position, oid)| Ok((position, self.load_commit(oid)?.message().to_string())))
            .collect()
    }

    pub fn stash_list(&self) -> anyhow::Result<()> {
        for (position, message) in self.stash_entries()? {
            writeln!(self.writer(), "stash@{{{}}}: {}", position, message)?;
        }

        Ok(())
    }

    /// Empty the stack; the stash commits stay in the commit log
    pub fn stash_clear(&self) -> anyhow::Result<()> {
        self.require_repository()?;

        self.refs().write_stash(&[])
    }

    fn apply_stash_entry(&self, index: usize, operation: &str) -> anyhow::Result<ObjectId> {
        let stack = self.refs().read_stash()?;
        let stash_oid = Self::stash_entry(&stack, index)?;

        if Inspector::new(self).is_workspace_dirty()? {
            return Err(RepositoryError::DirtyWorkingTree(format!(
                "your local changes would be overwritten by stash {}; commit or stash them first",
                operation
            ))
            .into());
        }

        self.sync_workspace(&stash_oid)?;

        Ok(stash_oid)
    }

    fn stash_entry(stack: &[ObjectId], index: usize) -> anyhow::Result<ObjectId> {
        if stack.is_empty() {
            return Err(RepositoryError::NoStashEntries.into());
        }

        stack
            .get(index)
            .cloned()
            .ok_or_else(|| RepositoryError::InvalidStashIndex(index).into())
    }
}
