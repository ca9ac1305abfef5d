//! Interactive rebase
//!
//! Starting a rebase lists the commits between the base and HEAD, lets the user
//! edit the todo list, persists a [`RebaseState`] and moves HEAD to a scratch
//! branch rooted at the base. The loop then replays one step at a time,
//! saving the state after each completed step.
//!
//! A failing step (usually a cherry-pick conflict) stops the loop with the
//! state still pointing at that step. `--continue` completes the step from
//! the index the user fixed up and resumes; `--abort` puts HEAD and the
//! rebased branch back where they were.

use crate::areas::repository::Repository;
use crate::artifacts::branch::REBASE_SCRATCH_BRANCH;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::rebase::cherry_pick::{self, CherryPickPlan};
use crate::artifacts::rebase::state::RebaseState;
use crate::artifacts::rebase::todo::{self, TodoAction, TodoStep};
use crate::artifacts::status::inspector::Inspector;
use crate::commands::porcelain::reset::ResetMode;
use crate::errors::RepositoryError;
use colored::Colorize;
use std::io::Write;

const REBASE_TODO_FILE: &str = "REBASE_TODO";
const COMMIT_MESSAGE_FILE: &str = "COMMIT_EDITMSG";

impl Repository {
    pub fn is_rebase_in_progress(&self) -> bool {
        RebaseState::exists(self.storage(), &self.rebase_state_path())
    }

    pub fn rebase_state(&self) -> anyhow::Result<Option<RebaseState>> {
        RebaseState::load(self.storage(), &self.rebase_state_path())
    }

    pub fn rebase_interactive(&self, base: &str) -> anyhow::Result<()> {
        self.require_repository()?;

        if self.is_rebase_in_progress() {
            anyhow::bail!(
                "a rebase is already in progress; run 'kit rebase --continue' or 'kit rebase --abort'"
            );
        }
        if Inspector::new(self).is_workspace_dirty()? {
            return Err(RepositoryError::DirtyWorkingTree(
                "cannot rebase: you have uncommitted changes; commit or stash them first"
                    .to_string(),
            )
            .into());
        }

        let base_oid = self.resolve_revision(base)?;
        let (head_oid, _) = self.head_commit()?.ok_or(RepositoryError::NoCommitsYet)?;

        let commits = self.commits_between(&base_oid, &head_oid)?;
        if commits.is_empty() {
            writeln!(self.writer(), "No commits to rebase.")?;
            return Ok(());
        }

        let edited = self
            .editor()
            .edit(REBASE_TODO_FILE, &todo::render_todo(&commits))?;
        let steps = todo::parse_todo(&edited);
        if steps.is_empty() {
            return Err(RepositoryError::NothingToDo("nothing to do".to_string()).into());
        }

        let head_branch = self.refs().current_branch()?;
        let state = RebaseState::new(head_branch.as_ref(), base_oid.clone(), head_oid, steps);
        state.save(self.storage(), &self.rebase_state_path())?;
        tracing::debug!(onto = %base_oid, steps = state.total_steps(), "starting rebase");

        let scratch_branch = Self::scratch_branch()?;
        self.refs().update_branch(&scratch_branch, &base_oid)?;
        self.refs().set_head_to_branch(&scratch_branch)?;
        self.sync_workspace(&base_oid)?;

        self.run_rebase_loop(state)
    }

    pub fn rebase_continue(&self) -> anyhow::Result<()> {
        self.require_repository()?;

        let mut state = self.rebase_state()?.ok_or_else(Self::no_rebase_in_progress)?;
        let line = state
            .current_line()
            .map(str::to_string)
            .ok_or_else(|| RepositoryError::NothingToDo("no rebase steps remaining".to_string()))?;

        if let Some(step) = TodoStep::parse(&line) {
            self.complete_step(&step)
                .or_else(|err| self.stop_rebase(&line, err))?;
        }

        state.advance();
        state.save(self.storage(), &self.rebase_state_path())?;

        self.run_rebase_loop(state)
    }

    pub fn rebase_abort(&self) -> anyhow::Result<()> {
        self.require_repository()?;

        let state = self.rebase_state()?.ok_or_else(Self::no_rebase_in_progress)?;

        match state.branch_name()? {
            Some(branch) => {
                self.refs().update_branch(&branch, &state.orig_head)?;
                self.refs().set_head_to_branch(&branch)?;
                self.sync_workspace(&state.orig_head)?;
            }
            None => {
                self.refs().detach_head(&state.orig_head)?;
                self.reset_to(&state.orig_head, ResetMode::Hard)?;
            }
        }

        self.remove_scratch_branch()?;
        RebaseState::clear(self.storage(), &self.rebase_state_path())?;
        writeln!(self.writer(), "Rebase aborted.")?;

        Ok(())
    }

    fn run_rebase_loop(&self, mut state: RebaseState) -> anyhow::Result<()> {
        while let Some(line) = state.current_line().map(str::to_string) {
            writeln!(
                self.writer(),
                "Rebase ({}/{}): {}",
                state.current_step + 1,
                state.total_steps(),
                line
            )?;

            match TodoStep::parse(&line) {
                Some(step) => self
                    .execute_step(&step)
                    .or_else(|err| self.stop_rebase(&line, err))?,
                None => tracing::warn!(line = %line, "skipping unrecognized todo line"),
            }

            state.advance();
            state.save(self.storage(), &self.rebase_state_path())?;
        }

        self.finish_rebase(&state)
    }

    fn execute_step(&self, step: &TodoStep) -> anyhow::Result<()> {
        let (_, commit) = self.commit_log().find_commit(step.commit())?;
        tracing::debug!(action = step.action().as_str(), commit = step.commit(), "rebase step");

        match step.action() {
            TodoAction::Pick => {
                self.cherry_pick(&commit, false)?;
            }
            TodoAction::Reword => {
                if self.cherry_pick(&commit, false)?.is_some() {
                    self.reword_head()?;
                }
            }
            TodoAction::Squash => {
                self.cherry_pick(&commit, true)?;
                self.squash_into_head(&commit)?;
            }
            TodoAction::Drop => {}
        }

        Ok(())
    }

    /// Finish a stopped step from the current index
    fn complete_step(&self, step: &TodoStep) -> anyhow::Result<()> {
        let (_, commit) = self.commit_log().find_commit(step.commit())?;

        match step.action() {
            TodoAction::Pick | TodoAction::Reword => {
                let created =
                    self.commit_index_onto_head(commit.author().clone(), commit.message())?;
                match created {
                    Some(_) if step.action() == TodoAction::Reword => self.reword_head()?,
                    Some(_) => {}
                    None => writeln!(self.writer(), "nothing to commit, skipping {}", step.commit())?,
                }
            }
            TodoAction::Squash => self.squash_into_head(&commit)?,
            TodoAction::Drop => {}
        }

        Ok(())
    }

    /// Replay `commit` onto HEAD; returns the new commit unless `no_commit` is set or nothing changed
    pub fn cherry_pick(&self, commit: &Commit, no_commit: bool) -> anyhow::Result<Option<ObjectId>> {
        let parent_tree = match commit.parent() {
            Some(parent) => self.commit_tree(&self.load_commit(parent)?)?,
            None => Default::default(),
        };
        let child_tree = self.commit_tree(commit)?;
        let head_tree = self.head_tree()?;

        let plan = cherry_pick::plan(&parent_tree, &child_tree, &head_tree)
            .map_err(RepositoryError::Conflict)?;
        if plan.is_empty() {
            tracing::debug!(commit = %commit.short_message(), "cherry-pick changes nothing");
        }
        self.apply_cherry_pick(&plan)?;

        if no_commit {
            return Ok(None);
        }

        self.commit_index_onto_head(commit.author().clone(), commit.message())
    }

    fn apply_cherry_pick(&self, plan: &CherryPickPlan) -> anyhow::Result<()> {
        let workspace = self.workspace();

        for path in plan.deletes.iter().chain(plan.writes.keys()) {
            if !workspace.is_safe_path(path) {
                return Err(RepositoryError::UnsafePath(path.clone()).into());
            }
        }

        let blobs = plan
            .writes
            .iter()
            .map(|(path, oid)| Ok((path, self.database().parse_blob(oid)?)))
            .collect::<anyhow::Result<Vec<_>>>()?;

        for path in &plan.deletes {
            workspace.remove_file(path)?;
        }
        for (path, blob) in &blobs {
            workspace.write_file(path, blob.content())?;
        }

        self.update_index(|index| {
            for path in &plan.deletes {
                index.remove(path);
            }
            for (path, oid) in &plan.writes {
                index.add(path.clone(), oid.clone());
            }

            Ok(())
        })
    }

    /// Commit the index on top of HEAD and move HEAD; `None` when the tree is unchanged
    fn commit_index_onto_head(
        &self,
        author: Author,
        message: &str,
    ) -> anyhow::Result<Option<ObjectId>> {
        let (head_oid, head_commit) = self.head_commit()?.ok_or(RepositoryError::NoCommitsYet)?;

        if &self.write_index_tree()? == head_commit.tree_oid() {
            tracing::debug!(head = %head_oid, "nothing to commit, step already applied");
            return Ok(None);
        }

        let (commit_id, _) = self.write_commit(Some(head_oid), author, message.to_string())?;
        self.refs().update_head(&commit_id)?;

        Ok(Some(commit_id))
    }

    /// Ask for a new message for HEAD and replace it with a reworded copy
    fn reword_head(&self) -> anyhow::Result<()> {
        let (_, head_commit) = self.head_commit()?.ok_or(RepositoryError::NoCommitsYet)?;

        let message = self
            .editor()
            .edit(COMMIT_MESSAGE_FILE, head_commit.message())?;
        if message.is_empty() {
            anyhow::bail!("aborting reword due to empty commit message");
        }

        let reworded = head_commit.amended(
            head_commit.tree_oid().clone(),
            message,
            head_commit.author().clone(),
        );
        let reworded_id = self.commit_log().append(&reworded)?;
        self.refs().update_head(&reworded_id)
    }

    /// Replace HEAD with a commit holding the index and both messages
    fn squash_into_head(&self, commit: &Commit) -> anyhow::Result<()> {
        let (_, head_commit) = self.head_commit()?.ok_or(RepositoryError::NoCommitsYet)?;

        let squashed = head_commit.amended(
            self.write_index_tree()?,
            format!("{}\n\n{}", head_commit.message(), commit.message()),
            head_commit.author().clone(),
        );
        let squashed_id = self.commit_log().append(&squashed)?;
        self.refs().update_head(&squashed_id)
    }

    fn stop_rebase(&self, line: &str, err: anyhow::Error) -> anyhow::Result<()> {
        {
            let mut writer = self.writer();
            writeln!(writer, "{} could not apply {}", "error:".red(), line)?;
            if let Some(RepositoryError::Conflict(conflicts)) = RepositoryError::kind_of(&err) {
                for conflict in conflicts {
                    writeln!(writer, "{}", conflict.to_string().red())?;
                }
            }
            writeln!(writer, "Resolve conflicts, then run 'kit rebase --continue'.")?;
            writeln!(writer, "To stop, run 'kit rebase --abort'.")?;
        }

        Err(err.context(format!("could not apply {}", line)))
    }

    fn finish_rebase(&self, state: &RebaseState) -> anyhow::Result<()> {
        let final_oid = self
            .refs()
            .read_head()?
            .ok_or_else(|| anyhow::anyhow!("rebase scratch branch has no commits"))?;

        let updated = match state.branch_name()? {
            Some(branch) => {
                self.refs().update_branch(&branch, &final_oid)?;
                self.refs().set_head_to_branch(&branch)?;
                branch.to_sym_ref_name().to_string()
            }
            None => {
                self.refs().detach_head(&final_oid)?;
                "detached HEAD".to_string()
            }
        };

        self.remove_scratch_branch()?;
        RebaseState::clear(self.storage(), &self.rebase_state_path())?;
        tracing::debug!(head = %final_oid, "rebase finished");

        writeln!(self.writer(), "Successfully rebased and updated {}.", updated)?;

        Ok(())
    }

    /// Commits after `base` up to `head`, oldest first; `base` must be an ancestor of `head`
    fn commits_between(
        &self,
        base: &ObjectId,
        head: &ObjectId,
    ) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let mut commits = Vec::new();

        for (oid, commit) in self.commit_log().ancestors(head)? {
            if &oid == base {
                commits.reverse();
                return Ok(commits);
            }
            commits.push((oid, commit));
        }

        Err(RepositoryError::InvalidCommit(format!(
            "{} is not an ancestor of HEAD",
            base.to_short_oid()
        ))
        .into())
    }

    fn remove_scratch_branch(&self) -> anyhow::Result<()> {
        let scratch_branch = Self::scratch_branch()?;
        if self.refs().branch_exists(&scratch_branch) {
            self.refs().delete_branch(&scratch_branch)?;
        }

        Ok(())
    }

    fn scratch_branch() -> anyhow::Result<BranchName> {
        BranchName::try_parse(REBASE_SCRATCH_BRANCH.to_string())
    }

    fn no_rebase_in_progress() -> anyhow::Error {
        RepositoryError::NothingToDo("no rebase in progress".to_string()).into()
    }
}
