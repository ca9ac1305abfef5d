//! Repository error kinds
//!
//! Every operation returns `anyhow::Result` and wraps lower-level failures with
//! operation context. The variants below are the kinds callers can branch on;
//! they survive context wrapping and can be recovered with
//! `anyhow::Error::downcast_ref::<RepositoryError>()`.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::rebase::cherry_pick::PathConflict;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not a kit repository (or any of the parent directories): {}", .0.display())]
    NotARepository(PathBuf),

    #[error("invalid commit: {0}")]
    InvalidCommit(String),

    #[error("unknown commit: {0}")]
    UnknownCommit(String),

    #[error("short commit id {prefix} is ambiguous (candidates: {})", .candidates.join(", "))]
    AmbiguousCommit {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("{0}")]
    DirtyWorkingTree(String),

    #[error("{0}")]
    NothingToDo(String),

    #[error("no commits yet")]
    NoCommitsYet,

    #[error("no stash entries found")]
    NoStashEntries,

    #[error("invalid stash index: {0}")]
    InvalidStashIndex(usize),

    #[error("{}", render_conflicts(.0))]
    Conflict(Vec<PathConflict>),

    #[error("unsafe path detected: {}", .0.display())]
    UnsafePath(PathBuf),

    #[error("{context}: {source}")]
    IoFailure {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl RepositoryError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        RepositoryError::IoFailure {
            context: context.into(),
            source,
        }
    }

    pub fn corrupt(oid: impl ToString, reason: impl Into<String>) -> Self {
        RepositoryError::CorruptObject {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }

    /// Find the repository error kind anywhere in an `anyhow` chain
    pub fn kind_of(error: &anyhow::Error) -> Option<&RepositoryError> {
        error
            .chain()
            .find_map(|cause| cause.downcast_ref::<RepositoryError>())
    }
}

fn render_conflicts(conflicts: &[PathConflict]) -> String {
    conflicts
        .iter()
        .map(|conflict| conflict.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
