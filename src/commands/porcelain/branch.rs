use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub fn branch(&self, branch_name: &str, source_revision: Option<&str>) -> anyhow::Result<()> {
        self.require_repository()?;
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        let source_oid = match source_revision {
            Some(source_revision) => self.resolve_revision(source_revision)?,
            None => self.refs().read_head()?.ok_or(RepositoryError::NoCommitsYet)?,
        };

        self.refs().create_branch(&branch_name, &source_oid)?;

        Ok(())
    }

    pub fn list_branches(&self) -> anyhow::Result<()> {
        self.require_repository()?;
        let current = self.refs().current_branch()?;

        for branch in self.refs().list_branches()? {
            if current.as_ref() == Some(&branch) {
                writeln!(self.writer(), "* {}", branch.to_string().green())?;
            } else {
                writeln!(self.writer(), "  {}", branch)?;
            }
        }

        Ok(())
    }

    pub fn delete_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        self.require_repository()?;
        let branch_name = BranchName::try_parse(branch_name.to_string())?;

        if self.refs().is_current_branch(&branch_name)? {
            anyhow::bail!(
                "cannot delete branch '{}' checked out at {}",
                branch_name,
                self.path().display()
            );
        }

        let oid = self.refs().delete_branch(&branch_name)?;
        writeln!(
            self.writer(),
            "Deleted branch {} (was {}).",
            branch_name,
            oid.to_short_oid()
        )?;

        Ok(())
    }
}
