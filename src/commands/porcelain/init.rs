use crate::areas::repository::Repository;
use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            anyhow::bail!(
                "repository already initialized in {}",
                self.git_path().display()
            );
        }

        for dir in [
            self.database().objects_path().to_path_buf(),
            self.refs().heads_path(),
            self.refs().tags_path(),
        ] {
            self.storage().create_dir_all(&dir).map_err(|err| {
                RepositoryError::io(format!("failed to create {}", dir.display()), err)
            })?;
        }

        for file in [self.commit_log().path().to_path_buf(), self.index_path()] {
            self.storage().write(&file, b"").map_err(|err| {
                RepositoryError::io(format!("failed to create {}", file.display()), err)
            })?;
        }

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
        self.refs().set_head_to_branch(&default_branch)?;

        writeln!(
            self.writer(),
            "Initialized empty kit repository in {}",
            self.git_path().display()
        )?;

        Ok(())
    }
}
