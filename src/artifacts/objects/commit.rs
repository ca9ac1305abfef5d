//! Commit object
//!
//! Commits form a singly-parented chain. Each one records:
//! - A tree object ID (file snapshot)
//! - At most one parent commit ID
//! - Author name, email and timestamp
//! - Commit message
//!
//! ## Identity
//!
//! The id is the SHA-1 of the framed canonical text:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Changing any field changes the id. Commits are persisted as [`CommitRecord`]
//! lines in the commit log; the id is recomputed and checked on every read.

use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Version of the commit log record schema
pub const COMMIT_RECORD_VERSION: u32 = 1;

pub const DEFAULT_AUTHOR_NAME: &str = "Unknown";
pub const DEFAULT_AUTHOR_EMAIL: &str = "unknown@example.com";

/// Author information: name, email, and timestamp with timezone
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current time (whole seconds)
    pub fn new(name: String, email: String) -> Self {
        let now = chrono::Local::now().fixed_offset();

        Author {
            name,
            email,
            timestamp: now.with_nanosecond(0).unwrap_or(now),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Resolve the author from `GIT_AUTHOR_*` env vars, then config, then defaults
    ///
    /// `lookup` is the configuration oracle (`user.name`, `user.email`).
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let name = std::env::var("GIT_AUTHOR_NAME")
            .ok()
            .filter(|name| !name.is_empty())
            .or_else(|| lookup("user.name"))
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());
        let email = std::env::var("GIT_AUTHOR_EMAIL")
            .ok()
            .filter(|email| !email.is_empty())
            .or_else(|| lookup("user.email"))
            .unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string());
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Author::new_with_timestamp(name, email, ts),
            None => Author::new(name, email),
        }
    }

    /// "Name <email> timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ID (None only for a root commit)
    parent: Option<ObjectId>,
    /// Tree object ID representing the file snapshot
    tree_oid: ObjectId,
    author: Author,
    message: String,
}

impl Commit {
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author,
            message,
        }
    }

    /// Same parent and author, different tree and/or message
    pub fn amended(&self, tree_oid: ObjectId, message: String, author: Author) -> Self {
        Commit::new(self.parent.clone(), tree_oid, author, message)
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    fn canonical_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("tree {}", self.tree_oid.as_ref())];
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines
    }
}

impl Packable for Commit {
    fn payload(&self) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(self.canonical_lines().join("\n")))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.canonical_lines().join("\n")
    }
}

/// One line of the commit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub version: u32,
    pub id: ObjectId,
    pub parent: Option<ObjectId>,
    pub tree: ObjectId,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl TryFrom<&Commit> for CommitRecord {
    type Error = anyhow::Error;

    fn try_from(commit: &Commit) -> anyhow::Result<Self> {
        Ok(CommitRecord {
            version: COMMIT_RECORD_VERSION,
            id: commit.object_id()?,
            parent: commit.parent.clone(),
            tree: commit.tree_oid.clone(),
            message: commit.message.clone(),
            author_name: commit.author.name.clone(),
            author_email: commit.author.email.clone(),
            timestamp: commit.author.timestamp,
        })
    }
}

impl From<CommitRecord> for Commit {
    fn from(record: CommitRecord) -> Self {
        Commit::new(
            record.parent,
            record.tree,
            Author::new_with_timestamp(record.author_name, record.author_email, record.timestamp),
            record.message,
        )
    }
}
