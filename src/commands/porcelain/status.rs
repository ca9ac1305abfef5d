use crate::areas::repository::Repository;
use crate::artifacts::status::inspector::Inspector;
use crate::artifacts::status::status_info::StatusInfo;
use colored::Colorize;
use std::io::Write;

const LABEL_WIDTH: usize = 8;

// Terminology:
// - staged changes: index entries that differ from HEAD's tree
// - unstaged changes: tracked files whose working copy differs from the index
// - untracked files: files on disk the index does not know about
impl Repository {
    pub fn status(&self, short: bool) -> anyhow::Result<()> {
        self.require_repository()?;

        let status = Inspector::new(self).status()?;

        if short {
            self.print_short_status(&status)
        } else {
            self.print_long_status(&status)
        }
    }

    fn print_short_status(&self, status: &StatusInfo) -> anyhow::Result<()> {
        let mut writer = self.writer();

        for (file, change) in &status.changed_files {
            writeln!(writer, "{} {}", change, file.display())?;
        }
        for file in &status.untracked_files {
            writeln!(writer, "?? {}", file.display())?;
        }

        Ok(())
    }

    fn print_long_status(&self, status: &StatusInfo) -> anyhow::Result<()> {
        let head_line = match self.refs().current_branch()? {
            Some(branch) => format!("On branch {}", branch),
            None => match self.refs().read_head()? {
                Some(oid) => format!("HEAD detached at {}", oid.to_short_oid()),
                None => "HEAD detached".to_string(),
            },
        };

        let mut writer = self.writer();
        writeln!(writer, "{}", head_line)?;

        if status.has_staged_changes() {
            writeln!(writer, "Changes to be committed:")?;
            for (file, change) in status.index_changes() {
                writeln!(writer, "{}{}", change, file.display().to_string().green())?;
            }
            writeln!(writer)?;
        }

        if status.workspace_changes().next().is_some() {
            writeln!(writer, "Changes not staged for commit:")?;
            for (file, change) in status.workspace_changes() {
                writeln!(writer, "{}{}", change, file.display().to_string().red())?;
            }
            writeln!(writer)?;
        }

        if !status.untracked_files.is_empty() {
            writeln!(writer, "Untracked files:")?;
            for file in &status.untracked_files {
                writeln!(
                    writer,
                    "{:>width$}{}",
                    "",
                    file.display().to_string().red(),
                    width = LABEL_WIDTH
                )?;
            }
            writeln!(writer)?;
        }

        if status.is_clean() {
            writeln!(writer, "nothing to commit, working tree clean")?;
        } else if !status.has_staged_changes() {
            if status.workspace_changes().next().is_some() {
                writeln!(writer, "no changes added to commit")?;
            } else {
                writeln!(writer, "nothing added to commit but untracked files present")?;
            }
        }

        Ok(())
    }
}
