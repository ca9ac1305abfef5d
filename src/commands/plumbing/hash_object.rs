use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use std::io::Write;
use std::path::Path;

impl Repository {
    pub fn hash_object(&self, object_path: &str, write: bool) -> anyhow::Result<()> {
        let data = self.workspace().read_file(Path::new(object_path))?;
        let object = Blob::new(data);

        let object_id = object.object_id()?;

        writeln!(self.writer(), "{}", object_id)?;

        if !write {
            return Ok(());
        }

        self.require_repository()?;
        self.database().store(&object)?;

        Ok(())
    }
}
