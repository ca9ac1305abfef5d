use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    pub fn tag(&self, tag_name: &str, revision: Option<&str>) -> anyhow::Result<()> {
        self.require_repository()?;
        let tag_name = BranchName::try_parse(tag_name.to_string())?;

        let oid = match revision {
            Some(revision) => self.resolve_revision(revision)?,
            None => self.refs().read_head()?.ok_or(RepositoryError::NoCommitsYet)?,
        };

        self.refs().create_tag(&tag_name, &oid)
    }

    pub fn list_tags(&self) -> anyhow::Result<()> {
        self.require_repository()?;

        for tag in self.refs().list_tags()? {
            writeln!(self.writer(), "{}", tag)?;
        }

        Ok(())
    }
}
