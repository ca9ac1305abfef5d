use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Snapshot the index as a commit and append it to the commit log; HEAD is not moved
    pub fn write_commit(
        &self,
        parent: Option<ObjectId>,
        author: Author,
        message: String,
    ) -> anyhow::Result<(ObjectId, Commit)> {
        let tree_id = self.write_index_tree()?;

        let commit = Commit::new(parent, tree_id, author, message);
        let commit_id = self.commit_log().append(&commit)?;

        Ok((commit_id, commit))
    }

    pub fn write_index_tree(&self) -> anyhow::Result<ObjectId> {
        let entries = self.load_index()?;

        self.write_tree(&entries)
    }
}
