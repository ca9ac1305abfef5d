use crate::areas::repository::Repository;
use crate::errors::RepositoryError;
use std::io::Write;
use std::path::{Path, PathBuf};

impl Repository {
    /// Move a tracked file or directory, carrying its index entries along
    ///
    /// A destination that is an existing directory receives the source under its own name.
    /// Untracked files inside a moved directory stay where they are.
    pub fn mv(&self, source: &str, destination: &str, force: bool) -> anyhow::Result<()> {
        self.require_repository()?;
        let workspace = self.workspace();

        let source = workspace.relativize(Path::new(source));
        let mut destination = workspace.relativize(Path::new(destination));
        for path in [&source, &destination] {
            if !workspace.is_safe_path(path) {
                return Err(RepositoryError::UnsafePath(path.clone()).into());
            }
        }
        if source == Path::new(".") {
            anyhow::bail!("cannot move the root of the working tree");
        }

        if let Some(name) = source.file_name() {
            if destination == Path::new(".") {
                destination = PathBuf::from(name);
            } else if workspace.is_dir(&destination) {
                destination = destination.join(name);
            }
        }
        if destination.starts_with(&source) {
            anyhow::bail!(
                "cannot move '{}' into itself ('{}')",
                source.display(),
                destination.display()
            );
        }

        self.update_index(|index| {
            let tracked = index.entries_under_path(&source);
            if tracked.is_empty() {
                anyhow::bail!("not under version control, source={}", source.display());
            }
            if workspace.exists(&destination) && !force {
                anyhow::bail!(
                    "destination '{}' exists; use -f to overwrite it",
                    destination.display()
                );
            }

            let moves = tracked
                .into_iter()
                .map(|file| {
                    let target = match file.strip_prefix(&source) {
                        Ok(rest) if !rest.as_os_str().is_empty() => destination.join(rest),
                        _ => destination.clone(),
                    };
                    (file, target)
                })
                .collect::<Vec<(PathBuf, PathBuf)>>();

            if let Some((missing, _)) = moves.iter().find(|(file, _)| !workspace.is_file(file)) {
                anyhow::bail!("bad source, '{}' is missing from the working tree", missing.display());
            }

            for (from, to) in &moves {
                let oid = index
                    .entries()
                    .get(from)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("'{}' is not tracked", from.display()))?;
                let content = workspace.read_file(from)?;

                workspace.write_file(to, &content)?;
                workspace.remove_file(from)?;
                index.remove(from);
                index.add(to.clone(), oid);
            }

            writeln!(
                self.writer(),
                "Renamed '{}' -> '{}'",
                source.display(),
                destination.display()
            )?;

            Ok(())
        })
    }
}
