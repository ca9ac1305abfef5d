//! Data structures and algorithms behind the repository areas
//!
//! - `branch`: Branch names and revision parsing
//! - `checkout`: Workspace synchronization plan
//! - `diff`: Path-level tree comparison
//! - `editor`: External edit step
//! - `index`: Index file format
//! - `objects`: Object types (blob, tree, commit)
//! - `rebase`: Todo list, persisted state and cherry-pick planning
//! - `status`: Working tree inspection

pub mod branch;
pub mod checkout;
pub mod diff;
pub mod editor;
pub mod index;
pub mod objects;
pub mod rebase;
pub mod status;
