use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::RepositoryError;
use std::io::Write;

const DETACHMENT_NOTICE: &str = r#"
You are in 'detached HEAD' state. You can look around, make experimental
changes and commit them, and you can discard any commits you make in this
state without impacting any branches by performing another checkout.

If you want to create a new branch to retain commits you create, you may
do so (now or later) by using the branch command. Example:

    kit branch <new-branch-name>
"#;

impl Repository {
    pub fn checkout(&self, target: &str, create_branch: bool) -> anyhow::Result<()> {
        self.require_repository()?;

        if create_branch {
            return self.checkout_new_branch(target);
        }

        if Inspector::new(self).is_workspace_dirty()? {
            return Err(RepositoryError::DirtyWorkingTree(
                "your local changes would be overwritten by checkout; commit or stash them first"
                    .to_string(),
            )
            .into());
        }

        let current_ref = self.refs().current_ref()?;
        let current_oid = self.refs().read_head()?;

        let target_branch = BranchName::try_parse(target.to_string())
            .ok()
            .filter(|branch| self.refs().branch_exists(branch));
        let target_oid = match &target_branch {
            Some(branch) => self
                .refs()
                .read_branch(branch)?
                .ok_or_else(|| RepositoryError::InvalidCommit(target.to_string()))?,
            None => self.resolve_revision(target)?,
        };

        self.sync_workspace(&target_oid)?;

        match &target_branch {
            Some(branch) => self.refs().set_head_to_branch(branch)?,
            None => self.refs().detach_head(&target_oid)?,
        }
        let new_ref = self.refs().current_ref()?;

        self.print_previous_head(&current_ref, current_oid.as_ref(), &target_oid)?;
        self.print_detachment_notice(&current_ref, &new_ref, target);
        self.print_new_head(&current_ref, &new_ref, &target_oid, target)?;

        Ok(())
    }

    fn checkout_new_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let head = self.refs().read_head()?.ok_or(RepositoryError::NoCommitsYet)?;

        self.refs().create_branch(&branch_name, &head)?;
        self.refs().set_head_to_branch(&branch_name)?;

        writeln!(self.writer(), "Switched to a new branch '{}'", branch_name)?;

        Ok(())
    }

    /// Make the working tree and the index match `target_oid`'s tree
    ///
    /// Files tracked by the current index but absent from the target are removed.
    pub fn sync_workspace(&self, target_oid: &ObjectId) -> anyhow::Result<()> {
        let previous = self.load_index()?;

        self.sync_workspace_from(&previous, target_oid)
    }

    /// Same as [`Repository::sync_workspace`], with the previously tracked paths given explicitly
    pub fn sync_workspace_from(
        &self,
        previous: &TreeEntries,
        target_oid: &ObjectId,
    ) -> anyhow::Result<()> {
        let target_commit = self.load_commit(target_oid)?;
        let target = self.commit_tree(&target_commit)?;

        tracing::debug!(target = %target_oid, paths = target.len(), "syncing workspace");
        Migration::new(self, previous, &target).apply_changes()?;
        self.write_index(target)
    }

    fn print_previous_head(
        &self,
        current_ref: &SymRefName,
        current_oid: Option<&ObjectId>,
        target_oid: &ObjectId,
    ) -> anyhow::Result<()> {
        if let Some(current_oid) = current_oid
            && current_ref.is_detached_head()
            && current_oid != target_oid
        {
            self.print_head_position("Previous HEAD position was", current_oid)?;
        }

        Ok(())
    }

    fn print_detachment_notice(&self, current_ref: &SymRefName, new_ref: &SymRefName, target: &str) {
        if !current_ref.is_detached_head() && new_ref.is_detached_head() {
            eprintln!("Note: checking out '{}'.\n{}", target, DETACHMENT_NOTICE);
        }
    }

    fn print_new_head(
        &self,
        current_ref: &SymRefName,
        new_ref: &SymRefName,
        target_oid: &ObjectId,
        target: &str,
    ) -> anyhow::Result<()> {
        if new_ref.is_detached_head() {
            self.print_head_position("HEAD is now at", target_oid)?;
        } else if new_ref == current_ref {
            writeln!(self.writer(), "Already on '{}'", target)?;
        } else {
            writeln!(self.writer(), "Switched to branch '{}'", target)?;
        }

        Ok(())
    }

    pub(crate) fn print_head_position(&self, message: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let commit = self.commit_log().load(oid)?;

        writeln!(
            self.writer(),
            "{} {} {}",
            message,
            oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
