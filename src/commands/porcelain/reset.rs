use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::Write;

/// How far a reset reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResetMode {
    /// Move HEAD only
    Soft,
    /// Move HEAD and replace the index
    #[default]
    Mixed,
    /// Move HEAD, replace the index and sync the working tree
    Hard,
}

impl Repository {
    pub fn reset(&self, revision: &str, mode: ResetMode) -> anyhow::Result<()> {
        self.require_repository()?;
        let target_oid = self.resolve_revision(revision)?;

        self.reset_to(&target_oid, mode)?;

        if mode == ResetMode::Hard {
            self.print_head_position("HEAD is now at", &target_oid)?;
        } else {
            writeln!(self.writer(), "HEAD is now at {}", target_oid.to_short_oid())?;
        }

        Ok(())
    }

    /// Move HEAD to `target_oid`; a failing index or workspace step puts HEAD back
    pub fn reset_to(&self, target_oid: &ObjectId, mode: ResetMode) -> anyhow::Result<()> {
        let target = self.load_commit(target_oid)?;
        let snapshot = self.refs().snapshot_head()?;
        let previous = match mode {
            ResetMode::Hard => Some(self.load_index()?),
            ResetMode::Soft | ResetMode::Mixed => None,
        };

        self.refs().update_head(target_oid)?;
        tracing::debug!(target = %target_oid, ?mode, "moved HEAD");

        let result = match mode {
            ResetMode::Soft => Ok(()),
            ResetMode::Mixed => self.reset_index(&target),
            ResetMode::Hard => self.reset_index(&target).and_then(|_| {
                self.sync_workspace_from(&previous.unwrap_or_default(), target_oid)
            }),
        };

        if let Err(err) = result {
            if let Err(restore_err) = self.refs().restore_head(&snapshot) {
                tracing::warn!(error = %restore_err, "unable to restore HEAD after a failed reset");
            }
            return Err(err).with_context(|| format!("reset to {} failed", target_oid));
        }

        Ok(())
    }

    fn reset_index(&self, target: &Commit) -> anyhow::Result<()> {
        let entries = self.commit_tree(target)?;

        self.write_index(entries)
    }
}
