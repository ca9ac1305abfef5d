//! Interactive rebase building blocks
//!
//! - `todo`: the editable step list handed to the user
//! - `state`: the persisted state that makes a stopped rebase resumable
//! - `cherry_pick`: per-path conflict detection for replaying one commit

pub mod cherry_pick;
pub mod state;
pub mod todo;
