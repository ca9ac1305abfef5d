use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print every tracked path in index order, with its blob id when `stage` is set
    pub fn ls_files(&self, stage: bool) -> anyhow::Result<()> {
        self.require_repository()?;

        let index = self.load_index()?;
        let mut writer = self.writer();

        for (path, oid) in &index {
            if stage {
                writeln!(writer, "{} {}", oid, path.display())?;
            } else {
                writeln!(writer, "{}", path.display())?;
            }
        }

        Ok(())
    }
}
