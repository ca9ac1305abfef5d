//! Commit graph
//!
//! Commits live in an append-only JSON-lines log (`.kit/commits.log`), one
//! [`CommitRecord`] per line. Records are never rewritten: amending, rewording
//! or rebasing always appends a new record and repoints a ref.
//!
//! Every record read back is checked against its schema version and its
//! recomputed id, so a hand-edited or truncated log surfaces as
//! [`RepositoryError::CorruptObject`] instead of silently resolving to the
//! wrong history.

use crate::areas::storage::Storage;
use crate::artifacts::objects::MIN_PREFIX_LENGTH;
use crate::artifacts::objects::commit::{COMMIT_RECORD_VERSION, Commit, CommitRecord};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug)]
pub struct CommitLog {
    path: Box<Path>,
    storage: Rc<dyn Storage>,
}

impl CommitLog {
    pub fn new(path: Box<Path>, storage: Rc<dyn Storage>) -> Self {
        CommitLog { path, storage }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a commit and return its id; appending a known commit is a no-op
    pub fn append(&self, commit: &Commit) -> anyhow::Result<ObjectId> {
        let record = CommitRecord::try_from(commit)?;

        if self.contains(&record.id)? {
            return Ok(record.id);
        }

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.storage.append(&self.path, &line).map_err(|err| {
            RepositoryError::io(
                format!("unable to append to commit log {}", self.path.display()),
                err,
            )
        })?;
        tracing::debug!(oid = %record.id, parent = ?record.parent, "appended commit");

        Ok(record.id)
    }

    /// Look up a commit by full id or by a unique prefix of at least four hex digits
    pub fn find_commit(&self, id_or_prefix: &str) -> anyhow::Result<(ObjectId, Commit)> {
        let needle = id_or_prefix.trim().to_lowercase();
        if needle.len() < MIN_PREFIX_LENGTH || !needle.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RepositoryError::UnknownCommit(id_or_prefix.to_string()).into());
        }

        let mut matches = self
            .records()?
            .into_iter()
            .filter(|record| record.id.starts_with(&needle))
            .collect::<Vec<_>>();

        match matches.len() {
            0 => Err(RepositoryError::UnknownCommit(id_or_prefix.to_string()).into()),
            1 => {
                let record = matches.remove(0);
                Ok((record.id.clone(), record.into()))
            }
            _ => Err(RepositoryError::AmbiguousCommit {
                prefix: id_or_prefix.to_string(),
                candidates: matches
                    .iter()
                    .map(|record| record.id.to_short_oid())
                    .collect(),
            }
            .into()),
        }
    }

    pub fn load(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        self.records()?
            .into_iter()
            .find(|record| &record.id == oid)
            .map(Commit::from)
            .ok_or_else(|| RepositoryError::UnknownCommit(oid.to_string()).into())
    }

    pub fn contains(&self, oid: &ObjectId) -> anyhow::Result<bool> {
        Ok(self.records()?.iter().any(|record| &record.id == oid))
    }

    /// Walk the parent chain starting at `oid` (inclusive), newest first
    pub fn ancestors(&self, oid: &ObjectId) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let mut chain = Vec::new();
        let mut next = Some(oid.clone());

        while let Some(current) = next {
            let commit = self.load(&current)?;
            next = commit.parent().cloned();
            chain.push((current, commit));
        }

        Ok(chain)
    }

    fn records(&self) -> anyhow::Result<Vec<CommitRecord>> {
        if !self.storage.is_file(&self.path) {
            return Ok(Vec::new());
        }

        let content = self.storage.read(&self.path).map_err(|err| {
            RepositoryError::io(
                format!("unable to read commit log {}", self.path.display()),
                err,
            )
        })?;
        let content = std::str::from_utf8(&content)
            .map_err(|err| RepositoryError::corrupt(self.path.display(), err.to_string()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| self.parse_record(number + 1, line))
            .collect()
    }

    fn parse_record(&self, line_number: usize, line: &str) -> anyhow::Result<CommitRecord> {
        let location = format!("{}:{}", self.path.display(), line_number);
        let record: CommitRecord = serde_json::from_str(line)
            .map_err(|err| RepositoryError::corrupt(&location, err.to_string()))?;

        if record.version != COMMIT_RECORD_VERSION {
            return Err(RepositoryError::corrupt(
                &location,
                format!("unsupported commit record version {}", record.version),
            )
            .into());
        }

        let recomputed = Commit::from(record.clone()).object_id()?;
        if recomputed != record.id {
            return Err(RepositoryError::corrupt(
                &record.id,
                format!("recorded id does not match content ({recomputed})"),
            )
            .into());
        }

        Ok(record)
    }
}
