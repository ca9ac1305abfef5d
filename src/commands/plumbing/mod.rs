//! Plumbing commands (low-level operations)
//!
//! Plumbing commands provide direct access to the object store and the commit
//! log. They're used for scripting and as building blocks for porcelain
//! commands.
//!
//! ## Commands
//!
//! - `hash-object`: Compute a blob id and optionally store it
//! - `cat-file`: Print a stored object or commit
//! - `write_commit`: Turn the index into a commit (internal)

pub mod cat_file;
pub mod hash_object;
pub mod write_commit;
