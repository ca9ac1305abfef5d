//! References (HEAD, branches, tags, stash stack)
//!
//! References are small text files under the repository directory:
//! - `HEAD`: either `ref: refs/heads/<branch>` or a literal commit id (detached)
//! - `refs/heads/<branch>`: branch tip commit id
//! - `refs/tags/<tag>`: tagged commit id
//! - `refs/stash`: stash stack, one commit id per line, newest first
//!
//! Moving HEAD with [`Refs::update_head`] follows a symbolic HEAD and rewrites
//! the branch it points to, so commits made on a branch stay on that branch.

use crate::areas::storage::Storage;
use crate::artifacts::branch::branch_name::{BranchName, HEAD_REF_NAME, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (refs/\S+)$";

/// Symbolic refs are followed at most this deep
const MAX_SYMREF_DEPTH: usize = 5;

/// Parsed content of a ref file
#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    SymRef { sym_ref_name: SymRefName },
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn parse(content: &str) -> anyhow::Result<Option<SymRefOrOid>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            return Ok(Some(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].to_string()),
            }));
        }

        ObjectId::try_parse(content.to_string())
            .map(|oid| Some(SymRefOrOid::Oid(oid)))
            .with_context(|| format!("malformed ref content {:?}", content))
    }

    fn render(&self) -> String {
        match self {
            SymRefOrOid::SymRef { sym_ref_name } => format!("ref: {}\n", sym_ref_name),
            SymRefOrOid::Oid(oid) => format!("{}\n", oid),
        }
    }
}

/// Raw content of the ref file HEAD movement writes to, captured for rollback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadSnapshot {
    target: PathBuf,
    content: Option<Bytes>,
}

#[derive(Debug)]
pub struct Refs {
    /// Path to the repository directory (typically `.kit`)
    path: Box<Path>,
    storage: Rc<dyn Storage>,
}

impl Refs {
    pub fn new(path: Box<Path>, storage: Rc<dyn Storage>) -> Self {
        Refs { path, storage }
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    pub fn tags_path(&self) -> PathBuf {
        self.refs_path().join("tags")
    }

    pub fn stash_path(&self) -> PathBuf {
        self.refs_path().join("stash")
    }

    fn read_ref_file(&self, path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !self.storage.is_file(path) {
            return Ok(None);
        }

        let content = self.storage.read(path).map_err(|err| {
            RepositoryError::io(format!("unable to read ref file {}", path.display()), err)
        })?;
        let content = String::from_utf8_lossy(&content);

        SymRefOrOid::parse(&content).with_context(|| format!("invalid ref file {}", path.display()))
    }

    fn write_ref_file(&self, path: &Path, content: &SymRefOrOid) -> anyhow::Result<()> {
        self.storage
            .write(path, content.render().as_bytes())
            .map_err(|err| {
                RepositoryError::io(format!("unable to write ref file {}", path.display()), err)
                    .into()
            })
    }

    /// Follow symbolic refs from `path` and return the file that finally holds an id
    fn resolve_target(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let mut current = path.to_path_buf();

        for _ in 0..MAX_SYMREF_DEPTH {
            match self.read_ref_file(&current)? {
                Some(SymRefOrOid::SymRef { sym_ref_name }) => {
                    current = self.path.join(sym_ref_name.as_ref_path());
                }
                Some(SymRefOrOid::Oid(_)) | None => return Ok(current),
            }
        }

        anyhow::bail!("symbolic ref loop at {}", path.display())
    }

    fn read_oid_at(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        let target = self.resolve_target(path)?;

        match self.read_ref_file(&target)? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            _ => Ok(None),
        }
    }

    /// The ref HEAD currently names: `refs/heads/<branch>`, or `HEAD` when detached
    pub fn current_ref(&self) -> anyhow::Result<SymRefName> {
        match self.read_ref_file(&self.head_path())? {
            Some(SymRefOrOid::SymRef { sym_ref_name }) => Ok(sym_ref_name),
            Some(SymRefOrOid::Oid(_)) | None => Ok(SymRefName::head()),
        }
    }

    /// The checked-out branch, or `None` when HEAD is detached
    pub fn current_branch(&self) -> anyhow::Result<Option<BranchName>> {
        Ok(self.current_ref()?.branch_name())
    }

    /// The checked-out branch name, or `fallback` when HEAD is detached
    pub fn current_branch_or(&self, fallback: &str) -> String {
        match self.current_branch() {
            Ok(Some(branch)) => branch.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(self.current_branch()?.as_ref() == Some(branch_name))
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_oid_at(&self.head_path())
    }

    /// Point HEAD (or the branch it names) at `oid`
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let target = self.resolve_target(&self.head_path())?;
        self.write_ref_file(&target, &SymRefOrOid::Oid(oid.clone()))
    }

    pub fn set_head_to_branch(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        self.write_ref_file(
            &self.head_path(),
            &SymRefOrOid::SymRef {
                sym_ref_name: branch_name.to_sym_ref_name(),
            },
        )
    }

    pub fn detach_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &SymRefOrOid::Oid(oid.clone()))
    }

    /// Capture what [`Refs::update_head`] is about to overwrite
    pub fn snapshot_head(&self) -> anyhow::Result<HeadSnapshot> {
        let target = self.resolve_target(&self.head_path())?;
        let content = if self.storage.is_file(&target) {
            Some(self.storage.read(&target).map_err(|err| {
                RepositoryError::io(format!("unable to read ref file {}", target.display()), err)
            })?)
        } else {
            None
        };

        Ok(HeadSnapshot { target, content })
    }

    pub fn restore_head(&self, snapshot: &HeadSnapshot) -> anyhow::Result<()> {
        let result = match &snapshot.content {
            Some(content) => self.storage.write(&snapshot.target, content),
            None if self.storage.is_file(&snapshot.target) => {
                self.storage.remove_file(&snapshot.target)
            }
            None => Ok(()),
        };

        result.map_err(|err| {
            RepositoryError::io(
                format!("unable to restore ref file {}", snapshot.target.display()),
                err,
            )
            .into()
        })
    }

    /// Resolve a short ref name: `HEAD`, then a branch, then a tag
    pub fn read_ref(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        if name == HEAD_REF_NAME {
            return self.read_head();
        }

        for base in [self.heads_path(), self.tags_path()] {
            let path = base.join(name);
            if self.storage.is_file(&path) {
                return self.read_oid_at(&path);
            }
        }

        Ok(None)
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.storage
            .is_file(&self.heads_path().join(branch_name.as_ref()))
    }

    pub fn read_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        self.read_oid_at(&self.heads_path().join(branch_name.as_ref()))
    }

    pub fn create_branch(&self, branch_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(branch_name) {
            anyhow::bail!("a branch named '{}' already exists", branch_name);
        }

        self.update_branch(branch_name, oid)
    }

    /// Point a branch at `oid`, creating it if needed
    pub fn update_branch(&self, branch_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(
            &self.heads_path().join(branch_name.as_ref()),
            &SymRefOrOid::Oid(oid.clone()),
        )
    }

    pub fn delete_branch(&self, branch_name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.heads_path().join(branch_name.as_ref());

        let oid = self
            .read_oid_at(&branch_path)?
            .ok_or_else(|| anyhow::anyhow!("branch '{}' not found", branch_name))?;

        self.storage.remove_file(&branch_path).map_err(|err| {
            RepositoryError::io(
                format!("unable to delete branch file {}", branch_path.display()),
                err,
            )
        })?;
        self.prune_empty_parent_dirs(&branch_path, &self.heads_path())?;

        Ok(oid)
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        self.list_refs(&self.heads_path())?
            .into_iter()
            .map(BranchName::try_parse)
            .collect()
    }

    pub fn create_tag(&self, tag_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        let tag_path = self.tags_path().join(tag_name.as_ref());
        if self.storage.is_file(&tag_path) {
            anyhow::bail!("tag '{}' already exists", tag_name);
        }

        self.write_ref_file(&tag_path, &SymRefOrOid::Oid(oid.clone()))
    }

    pub fn read_tag(&self, tag_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        self.read_oid_at(&self.tags_path().join(tag_name.as_ref()))
    }

    pub fn list_tags(&self) -> anyhow::Result<Vec<String>> {
        self.list_refs(&self.tags_path())
    }

    fn list_refs(&self, base: &Path) -> anyhow::Result<Vec<String>> {
        let files = self.storage.list_files(base).map_err(|err| {
            RepositoryError::io(format!("unable to list refs in {}", base.display()), err)
        })?;

        let mut names = files
            .iter()
            .filter_map(|file| file.strip_prefix(base).ok())
            .filter_map(|relative| relative.to_str())
            .map(|name| name.replace(std::path::MAIN_SEPARATOR, "/"))
            .collect::<Vec<_>>();
        names.sort();

        Ok(names)
    }

    fn prune_empty_parent_dirs(&self, path: &Path, stop_at: &Path) -> anyhow::Result<()> {
        let mut current = path.parent();

        while let Some(dir) = current {
            if dir == stop_at || !dir.starts_with(stop_at) {
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

    /// Stash stack, newest entry first
    pub fn read_stash(&self) -> anyhow::Result<Vec<ObjectId>> {
        let stash_path = self.stash_path();
        if !self.storage.is_file(&stash_path) {
            return Ok(Vec::new());
        }

        let content = self.storage.read(&stash_path).map_err(|err| {
            RepositoryError::io(
                format!("unable to read stash stack {}", stash_path.display()),
                err,
            )
        })?;

        String::from_utf8_lossy(&content)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                ObjectId::try_parse(line.to_string())
                    .with_context(|| format!("invalid stash entry {:?}", line))
            })
            .collect()
    }

    pub fn write_stash(&self, entries: &[ObjectId]) -> anyhow::Result<()> {
        let stash_path = self.stash_path();
        let content = entries
            .iter()
            .map(|oid| format!("{}\n", oid))
            .collect::<String>();

        self.storage
            .write(&stash_path, content.as_bytes())
            .map_err(|err| {
                RepositoryError::io(
                    format!("unable to write stash stack {}", stash_path.display()),
                    err,
                )
                .into()
            })
    }
}
