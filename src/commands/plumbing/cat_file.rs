use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// Print a commit from the commit log, or a blob/tree from the object store
    pub fn cat_file(&self, object_id: &str) -> anyhow::Result<()> {
        self.require_repository()?;

        match self.commit_log().find_commit(object_id) {
            Ok((_, commit)) => {
                writeln!(self.writer(), "{}", commit.display())?;
                return Ok(());
            }
            Err(err) => match RepositoryError::kind_of(&err) {
                Some(RepositoryError::UnknownCommit(_)) => {}
                _ => return Err(err),
            },
        }

        let object_id = ObjectId::try_parse(object_id.to_string())
            .map_err(|_| RepositoryError::InvalidCommit(object_id.to_string()))?;

        match self.database().object_type(&object_id)? {
            ObjectType::Blob => {
                let blob = self.database().parse_blob(&object_id)?;
                self.writer().write_all(blob.content())?;
            }
            ObjectType::Tree => {
                let tree = self.database().parse_tree(&object_id)?;
                writeln!(self.writer(), "{}", tree.display())?;
            }
            ObjectType::Commit => {
                anyhow::bail!("commit {} is not in the commit log", object_id)
            }
        }

        Ok(())
    }
}
