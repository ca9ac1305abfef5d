use crate::areas::repository::Repository;
use crate::errors::RepositoryError;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Remove tracked files from the working tree and the index
    pub fn rm(&self, paths: &[String], recursive: bool) -> anyhow::Result<()> {
        self.require_repository()?;
        let workspace = self.workspace();

        self.update_index(|index| {
            for path in paths {
                let relative = workspace.relativize(Path::new(path));
                if !workspace.is_safe_path(&relative) {
                    return Err(RepositoryError::UnsafePath(relative).into());
                }

                let tracked = index.entries_under_path(&relative);
                if tracked.is_empty() {
                    anyhow::bail!("pathspec '{}' did not match any files", path);
                }
                if !recursive && tracked != [relative.clone()] {
                    anyhow::bail!("not removing '{}' recursively without -r", path);
                }

                for file in &tracked {
                    workspace.remove_file(file)?;
                    index.remove(file);
                    writeln!(self.writer(), "rm '{}'", file.display())?;
                }
            }

            Ok(())
        })
    }
}
