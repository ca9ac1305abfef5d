//! Index (staging area)
//!
//! The index tracks which blob every path will have in the next commit. It is
//! loaded with [`Index::rehydrate`], mutated in memory and persisted with
//! [`Index::write_updates`]; callers normally go through
//! `Repository::update_index`, which only persists when the mutation succeeds.
//!
//! See [`crate::artifacts::index`] for the on-disk layout.

use crate::areas::storage::Storage;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION, checksum};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use crate::errors::RepositoryError;
use anyhow::Context;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug)]
pub struct Index {
    /// Path to the index file (typically `.kit/index`)
    path: Box<Path>,
    storage: Rc<dyn Storage>,
    entries: TreeEntries,
}

impl Index {
    pub fn new(path: Box<Path>, storage: Rc<dyn Storage>) -> Self {
        Index {
            path,
            storage,
            entries: TreeEntries::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the entries from disk; a missing or empty file is an empty index
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();

        if !self.storage.is_file(&self.path) {
            return Ok(());
        }

        let content = self.storage.read(&self.path).map_err(|err| {
            RepositoryError::io(
                format!("unable to read index file {}", self.path.display()),
                err,
            )
        })?;
        if content.is_empty() {
            return Ok(());
        }

        self.entries = Self::parse(&content)
            .with_context(|| format!("corrupt index file {}", self.path.display()))?;

        Ok(())
    }

    fn parse(content: &[u8]) -> anyhow::Result<TreeEntries> {
        let body = checksum::verify(content)?;
        if body.len() < HEADER_SIZE {
            anyhow::bail!("index header is truncated");
        }

        let mut reader = Cursor::new(body);
        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;
        if &signature != SIGNATURE {
            anyhow::bail!("invalid index file signature");
        }

        let version = reader.read_u32::<BigEndian>()?;
        if version != VERSION {
            anyhow::bail!("unsupported index file version: {}", version);
        }

        let entries_count = reader.read_u32::<BigEndian>()?;
        let mut entries = TreeEntries::new();

        for _ in 0..entries_count {
            let oid = ObjectId::read_h40_from(&mut reader).context("truncated index entry")?;
            let path_length = reader.read_u16::<BigEndian>()? as usize;
            let mut path_bytes = vec![0u8; path_length];
            reader.read_exact(&mut path_bytes)?;
            let path = String::from_utf8(path_bytes).context("index path is not valid UTF-8")?;

            entries.insert(PathBuf::from(path), oid);
        }

        if (reader.position() as usize) != body.len() {
            anyhow::bail!("trailing bytes after the last index entry");
        }

        Ok(entries)
    }

    fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        let mut content = Vec::with_capacity(HEADER_SIZE);
        content.extend_from_slice(SIGNATURE);
        content.write_u32::<BigEndian>(VERSION)?;
        content.write_u32::<BigEndian>(self.entries.len() as u32)?;

        for (path, oid) in &self.entries {
            let name = path
                .to_str()
                .with_context(|| format!("path {} is not valid UTF-8", path.display()))?;
            let name_length = u16::try_from(name.len())
                .with_context(|| format!("path {} is too long for the index", name))?;

            oid.write_h40_to(&mut content)?;
            content.write_u16::<BigEndian>(name_length)?;
            content.extend_from_slice(name.as_bytes());
        }

        Ok(checksum::seal(content))
    }

    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let content = self.serialize()?;

        self.storage.write(&self.path, &content).map_err(|err| {
            RepositoryError::io(
                format!("unable to write index file {}", self.path.display()),
                err,
            )
        })?;

        Ok(())
    }

    pub fn add(&mut self, path: PathBuf, oid: ObjectId) {
        // a file replaces any entries it used to be a directory for, and vice versa
        self.remove_children(&path);
        for parent in path.ancestors().skip(1) {
            self.entries.remove(parent);
        }

        self.entries.insert(path, oid);
    }

    pub fn remove(&mut self, path: &Path) {
        self.entries.remove(path);
        self.remove_children(path);
    }

    fn remove_children(&mut self, path: &Path) {
        self.entries
            .retain(|entry_path, _| entry_path == path || !entry_path.starts_with(path));
    }

    /// Replace every entry at once
    pub fn replace(&mut self, entries: TreeEntries) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &TreeEntries {
        &self.entries
    }

    pub fn entries_under_path(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|entry_path| path == Path::new(".") || entry_path.starts_with(path))
            .cloned()
            .collect()
    }
}
