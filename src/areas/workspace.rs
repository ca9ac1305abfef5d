use crate::areas::storage::Storage;
use crate::artifacts::objects::blob::Blob;
use crate::errors::RepositoryError;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// Name of the repository directory inside the working tree
pub const REPOSITORY_DIR: &str = ".kit";

const IGNORED_PATHS: [&str; 1] = [REPOSITORY_DIR];

/// Working tree rooted at the repository root; every path taken or returned is relative
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
    storage: Rc<dyn Storage>,
}

impl Workspace {
    pub fn new(path: Box<Path>, storage: Rc<dyn Storage>) -> Self {
        Workspace { path, storage }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => IGNORED_PATHS.iter().any(|ignored| name == *ignored),
            _ => false,
        })
    }

    /// Turn a user-supplied path into a workspace-relative one
    pub fn relativize(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix(&self.path).unwrap_or(path);

        let normalized = relative
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect::<PathBuf>();

        if normalized.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            normalized
        }
    }

    /// Whether `path` stays inside the working tree and outside the repository directory
    pub fn is_safe_path(&self, path: &Path) -> bool {
        let mut depth = 0usize;

        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => return false,
                Component::CurDir => {}
                Component::ParentDir => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                Component::Normal(name) => {
                    if depth == 0 && name == REPOSITORY_DIR {
                        return false;
                    }
                    depth += 1;
                }
            }
        }

        true
    }

    /// List every regular file below `root` (the whole tree when `None`)
    pub fn list_files(&self, root: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root = match root {
            Some(root) if root != Path::new(".") => self.path.join(root),
            _ => self.path.to_path_buf(),
        };

        if self.storage.is_file(&root) {
            return Ok(root
                .strip_prefix(&self.path)
                .map(|relative| vec![relative.to_path_buf()])
                .unwrap_or_default());
        }

        let files = self.storage.list_files(&root).map_err(|err| {
            RepositoryError::io(format!("unable to list files in {}", root.display()), err)
        })?;

        let mut files = files
            .into_iter()
            .filter_map(|file| file.strip_prefix(&self.path).ok().map(Path::to_path_buf))
            .filter(|file| !Self::is_ignored(file))
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.storage.exists(&self.path.join(file_path))
    }

    pub fn is_file(&self, file_path: &Path) -> bool {
        self.storage.is_file(&self.path.join(file_path))
    }

    pub fn is_dir(&self, dir_path: &Path) -> bool {
        self.exists(dir_path) && !self.is_file(dir_path)
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        self.storage
            .read(&self.path.join(file_path))
            .map_err(|err| {
                RepositoryError::io(format!("unable to read {}", file_path.display()), err).into()
            })
    }

    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        self.storage
            .write(&self.path.join(file_path), data)
            .map_err(|err| {
                RepositoryError::io(format!("unable to write {}", file_path.display()), err).into()
            })
    }

    /// Delete a file, tolerating one that is already gone, and prune emptied parents
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let absolute_path = self.path.join(file_path);

        match self.storage.remove_file(&absolute_path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(RepositoryError::io(
                    format!("unable to remove {}", file_path.display()),
                    err,
                )
                .into());
            }
        }

        let mut current = absolute_path.parent();
        while let Some(dir) = current {
            if dir == self.path.as_ref() || !dir.starts_with(&self.path) {
                break;
            }
            let removed = self.storage.remove_dir_if_empty(dir).map_err(|err| {
                RepositoryError::io(format!("unable to remove {}", dir.display()), err)
            })?;
            if !removed {
                break;
            }
            current = dir.parent();
        }

        Ok(())
    }
}
