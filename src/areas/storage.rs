//! Filesystem abstraction shared by every repository area
//!
//! All persistent state (objects, commit log, index, refs, working tree) is read
//! and written through [`Storage`], so the whole engine can run against the real
//! filesystem ([`DiskStorage`]) or an in-memory map ([`MemoryStorage`]).
//!
//! Paths handed to a storage are always absolute-ish paths built by joining the
//! repository root with a relative path; the storage never interprets them.

use bytes::Bytes;
use fake::rand;
use file_guard::Lock;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait Storage: std::fmt::Debug {
    fn read(&self, path: &Path) -> io::Result<Bytes>;

    /// Replace the file content, creating missing parent directories
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Append to the file, creating it (and its parents) if missing
    fn append(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory only if it has no entries left; returns whether it was removed
    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Recursively list every regular file below `root`
    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

#[derive(Debug, Default)]
pub struct DiskStorage;

impl DiskStorage {
    fn generate_temp_name() -> String {
        format!("tmp-kit-{}", rand::random::<u32>())
    }
}

impl Storage for DiskStorage {
    fn read(&self, path: &Path) -> io::Result<Bytes> {
        std::fs::read(path).map(Bytes::from)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
        std::fs::create_dir_all(parent)?;

        // write a sibling temp file and rename it over the target to make it atomic
        let temp_path = parent.join(Self::generate_temp_name());
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        std::fs::rename(&temp_path, path).inspect_err(|_| {
            let _ = std::fs::remove_file(&temp_path);
        })
    }

    fn append(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let mut lock = file_guard::lock(&mut file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(data)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool> {
        if !path.is_dir() || path.read_dir()?.next().is_some() {
            return Ok(false);
        }

        std::fs::remove_dir(path)?;
        Ok(true)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        if !root.exists() {
            return Ok(Vec::new());
        }

        WalkDir::new(root)
            .into_iter()
            .filter(|entry| entry.as_ref().map_or(true, |e| e.file_type().is_file()))
            .map(|entry| entry.map(|e| e.into_path()).map_err(io::Error::other))
            .collect()
    }
}

/// Map-backed storage used by tests; directories exist implicitly while they hold files
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<BTreeMap<PathBuf, Bytes>>,
    dirs: RefCell<BTreeMap<PathBuf, ()>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<Bytes> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), Bytes::copy_from_slice(data));
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut files = self.files.borrow_mut();
        let content = files.entry(path.to_path_buf()).or_default();
        let mut buffer = content.to_vec();
        buffer.extend_from_slice(data);
        *content = Bytes::from(buffer);

        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.files
            .borrow_mut()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }

    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool> {
        let has_children = self.files.borrow().keys().any(|file| file.starts_with(path));
        if has_children {
            return Ok(false);
        }

        Ok(self.dirs.borrow_mut().remove(path).is_some())
    }

    fn exists(&self, path: &Path) -> bool {
        self.dirs.borrow().contains_key(path)
            || self.files.borrow().keys().any(|file| file.starts_with(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.dirs.borrow_mut().insert(path.to_path_buf(), ());
        Ok(())
    }

    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|file| file.starts_with(root))
            .cloned()
            .collect())
    }
}
