//! Content-addressed object types
//!
//! Everything the object store holds is framed as `<type> <size>\0<payload>` and
//! identified by the SHA-1 of the framed bytes:
//!
//! - **Blob**: raw file content
//! - **Tree**: a flat, sorted snapshot of path -> blob id
//! - **Commit**: tree, optional parent, author and message (hashed the same way,
//!   but persisted in the commit log rather than the object store)

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest accepted abbreviation of an object id
pub const MIN_PREFIX_LENGTH: usize = 4;
