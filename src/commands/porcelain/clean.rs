use crate::areas::repository::Repository;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// Delete untracked files; `dry_run` only lists them
    pub fn clean(&self, force: bool, dry_run: bool) -> anyhow::Result<()> {
        self.require_repository()?;

        if !force && !dry_run {
            anyhow::bail!("refusing to clean without -f; use -n to see what would be removed");
        }

        let index = self.load_index()?;
        let untracked = Inspector::new(self).untracked_files(&index)?;
        let workspace = self.workspace();

        for file in &untracked {
            if !workspace.is_safe_path(file) {
                return Err(RepositoryError::UnsafePath(file.clone()).into());
            }

            if dry_run {
                writeln!(self.writer(), "Would remove {}", file.display())?;
            } else {
                workspace.remove_file(file)?;
                writeln!(self.writer(), "Removing {}", file.display())?;
            }
        }
        tracing::debug!(files = untracked.len(), dry_run, "cleaned untracked files");

        Ok(())
    }
}
