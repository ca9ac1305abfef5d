//! Porcelain commands (user-facing operations)
//!
//! Porcelain commands provide the high-level user interface for version
//! control. They compose plumbing commands and repository areas into the
//! workflows users run.
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add` / `rm` / `mv`: Stage, remove or move files
//! - `commit`: Create a new commit (or amend HEAD), optionally staging tracked changes first
//! - `status` / `ls-files`: Report staged, unstaged and untracked changes, list tracked files
//! - `clean`: Delete untracked files
//! - `branch` / `tag`: Manage named refs
//! - `checkout`: Switch branches and sync the working tree
//! - `config`: Read and write repository settings
//! - `reset`: Move HEAD in soft, mixed or hard mode
//! - `stash`: Shelve and restore uncommitted changes
//! - `rebase`: Interactively replay commits onto a new base

pub mod add;
pub mod branch;
pub mod checkout;
pub mod clean;
pub mod commit;
pub mod config;
pub mod init;
pub mod ls_files;
pub mod mv;
pub mod rebase;
pub mod reset;
pub mod rm;
pub mod stash;
pub mod status;
pub mod tag;
