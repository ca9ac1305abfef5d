use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    pub fn commit(&self, message: &str, amend: bool) -> anyhow::Result<ObjectId> {
        self.require_repository()?;

        let message = message.trim().to_string();
        if message.is_empty() {
            anyhow::bail!("aborting commit due to empty commit message");
        }

        let head = self.head_commit()?;
        let tree_id = self.write_index_tree()?;

        let (commit_id, commit) = if amend {
            let (_, head_commit) = head.as_ref().ok_or(RepositoryError::NoCommitsYet)?;
            let amended = head_commit.amended(tree_id, message, self.author());
            let amended_id = self.commit_log().append(&amended)?;

            (amended_id, amended)
        } else {
            let unchanged = match &head {
                Some((_, head_commit)) => head_commit.tree_oid() == &tree_id,
                None => self.load_index()?.is_empty(),
            };
            if unchanged {
                return Err(RepositoryError::NothingToDo(
                    "nothing to commit, working tree clean".to_string(),
                )
                .into());
            }

            let parent = head.as_ref().map(|(oid, _)| oid.clone());
            self.write_commit(parent, self.author(), message)?
        };

        self.refs().update_head(&commit_id)?;
        self.print_commit_summary(&commit_id, &commit)?;

        Ok(commit_id)
    }

    /// Stage changes to tracked files, then commit
    pub fn commit_all(&self, message: &str, amend: bool) -> anyhow::Result<ObjectId> {
        self.require_repository()?;
        self.stage_tracked_changes()?;

        self.commit(message, amend)
    }

    fn print_commit_summary(&self, commit_id: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        let branch = self.refs().current_branch_or("detached HEAD");
        let is_root = match commit.parent() {
            Some(_) => "",
            None => "(root-commit) ",
        };

        writeln!(
            self.writer(),
            "[{} {}{}] {}",
            branch,
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
