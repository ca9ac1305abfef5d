use crate::areas::repository::Repository;
use crate::errors::RepositoryError;
use std::path::Path;

impl Repository {
    pub fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        self.require_repository()?;
        let workspace = self.workspace();

        self.update_index(|index| {
            for path in paths {
                let relative = workspace.relativize(Path::new(path));
                if !workspace.is_safe_path(&relative) {
                    return Err(RepositoryError::UnsafePath(relative).into());
                }

                let on_disk = relative == Path::new(".") || workspace.exists(&relative);
                let tracked = index.entries_under_path(&relative);

                if !on_disk && tracked.is_empty() {
                    anyhow::bail!("pathspec '{}' did not match any files", path);
                }

                for file in workspace.list_files(Some(&relative))? {
                    let blob = workspace.parse_blob(&file)?;
                    let blob_id = self.database().store(&blob)?;
                    index.add(file, blob_id);
                }

                // tracked files gone from disk are unstaged
                for file in tracked {
                    if !workspace.is_file(&file) {
                        index.remove(&file);
                    }
                }
            }

            Ok(())
        })
    }

    /// Stage every file in the working tree and unstage tracked files gone from disk
    pub fn add_all(&self) -> anyhow::Result<()> {
        self.add(&[".".to_string()])
    }

    /// Re-hash every tracked file; tracked files missing on disk are unstaged
    ///
    /// Untracked files are left alone.
    pub fn stage_tracked_changes(&self) -> anyhow::Result<()> {
        let workspace = self.workspace();

        self.update_index(|index| {
            for path in index.entries().keys().cloned().collect::<Vec<_>>() {
                if workspace.is_file(&path) {
                    let blob = workspace.parse_blob(&path)?;
                    let blob_id = self.database().store(&blob)?;
                    index.add(path, blob_id);
                } else {
                    index.remove(&path);
                }
            }

            Ok(())
        })
    }
}
