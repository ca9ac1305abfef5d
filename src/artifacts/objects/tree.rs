//! Tree object
//!
//! A tree is a flat snapshot of the staging area: every tracked path mapped to
//! the id of its blob. Commits point at a tree to describe their file state.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<path>\0<20-byte-sha1>`, entries sorted bytewise by path
//!
//! Sorting happens at serialization time, so two equal mappings always produce
//! the same bytes and therefore the same id, whatever map built them.

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Path -> blob id mapping shared by trees and the index
pub type TreeEntries = BTreeMap<PathBuf, ObjectId>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: TreeEntries,
}

impl Tree {
    pub fn new(entries: TreeEntries) -> Self {
        Tree { entries }
    }

    pub fn entries(&self) -> &TreeEntries {
        &self.entries
    }

    pub fn into_entries(self) -> TreeEntries {
        self.entries
    }

    fn sorted_entries(&self) -> anyhow::Result<Vec<(&str, &ObjectId)>> {
        let mut entries = self
            .entries
            .iter()
            .map(|(path, oid)| {
                let name = path
                    .to_str()
                    .with_context(|| format!("path {} is not valid UTF-8", path.display()))?;
                if name.is_empty() || name.contains('\0') {
                    anyhow::bail!("invalid tree entry name {:?}", name);
                }

                Ok((name, oid))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        entries.sort_by(|(left, _), (right, _)| left.as_bytes().cmp(right.as_bytes()));

        Ok(entries)
    }
}

impl Packable for Tree {
    fn payload(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();

        for (name, oid) in self.sorted_entries()? {
            content_bytes.write_all(name.as_bytes())?;
            content_bytes.push(0);
            oid.write_h40_to(&mut content_bytes)?;
        }

        Ok(Bytes::from(content_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        let mut name_bytes = Vec::new();

        loop {
            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("unexpected EOF in entry name");
            }
            let name = std::str::from_utf8(&name_bytes)?.to_owned();

            let oid =
                ObjectId::read_h40_from(&mut reader).context("unexpected EOF in object id")?;

            if entries.insert(PathBuf::from(&name), oid).is_some() {
                anyhow::bail!("duplicate tree entry {name}");
            }
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.sorted_entries()
            .unwrap_or_default()
            .into_iter()
            .map(|(name, oid)| format!("blob {}\t{}", oid, name))
            .collect::<Vec<String>>()
            .join("\n")
    }
}

impl From<TreeEntries> for Tree {
    fn from(entries: TreeEntries) -> Self {
        Tree::new(entries)
    }
}
