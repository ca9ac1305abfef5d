//! Persistent repository areas
//!
//! - `storage`: Filesystem abstraction (disk or in-memory)
//! - `database`: Content-addressed object store for blobs and trees
//! - `commit_log`: Append-only commit graph
//! - `index`: Staging area
//! - `refs`: HEAD, branches, tags and the stash stack
//! - `workspace`: Working tree file operations
//! - `config`: Repository settings
//! - `repository`: The handle tying the areas together

pub mod commit_log;
pub mod config;
pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod storage;
pub mod workspace;
