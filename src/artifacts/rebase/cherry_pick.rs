//! Cherry-pick planning
//!
//! Replaying commit `C` (parent `P`) onto HEAD means applying
//! `diff(tree(P), tree(C))` to HEAD's tree `H`. Each changed path is checked
//! against `H`:
//!
//! | change          | `H[path]`        | outcome                              |
//! |-----------------|------------------|--------------------------------------|
//! | delete `old`    | absent           | nothing to do                        |
//! | delete `old`    | `old`            | delete                               |
//! | delete `old`    | other            | deleted upstream but modified here   |
//! | `old` -> `new`  | `old`            | write `new`                          |
//! | `old` -> `new`  | other, even `new`| modified both                        |
//! | `old` -> `new`  | absent           | modified upstream, deleted here      |
//! | add `new`       | absent           | write `new`                          |
//! | add `new`       | present          | modified both                        |
//!
//! The whole plan is computed before anything is written, in path order, and
//! every conflict is reported at once. A conflicting pick applies nothing.

use crate::artifacts::diff::tree_diff::{self, TreeChangeType};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ModifiedBoth,
    ModifiedUpstreamDeletedHere,
    DeletedUpstreamModifiedHere,
}

impl ConflictKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ConflictKind::ModifiedBoth => "modified both",
            ConflictKind::ModifiedUpstreamDeletedHere => "modified upstream, deleted here",
            ConflictKind::DeletedUpstreamModifiedHere => "deleted upstream but modified here",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConflict {
    pub path: PathBuf,
    pub kind: ConflictKind,
}

impl std::fmt::Display for PathConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CONFLICT ({}): {}",
            self.kind.describe(),
            self.path.display()
        )
    }
}

/// Workspace and index changes a conflict-free pick applies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CherryPickPlan {
    pub writes: BTreeMap<PathBuf, ObjectId>,
    pub deletes: Vec<PathBuf>,
}

impl CherryPickPlan {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.deletes.is_empty()
    }
}

pub fn plan(
    parent: &TreeEntries,
    child: &TreeEntries,
    head: &TreeEntries,
) -> Result<CherryPickPlan, Vec<PathConflict>> {
    let mut plan = CherryPickPlan::default();
    let mut conflicts = Vec::new();

    for (path, change) in tree_diff::compare(parent, child) {
        let here = head.get(&path);

        let conflict = match (&change, here) {
            (TreeChangeType::Deleted(_), None) => None,
            (TreeChangeType::Deleted(old), Some(here)) if here == old => {
                plan.deletes.push(path.clone());
                None
            }
            (TreeChangeType::Deleted(_), Some(_)) => Some(ConflictKind::DeletedUpstreamModifiedHere),
            (TreeChangeType::Added(new), None) => {
                plan.writes.insert(path.clone(), new.clone());
                None
            }
            (TreeChangeType::Added(_), Some(_)) => Some(ConflictKind::ModifiedBoth),
            (TreeChangeType::Modified { old, new }, Some(here)) if here == old => {
                plan.writes.insert(path.clone(), new.clone());
                None
            }
            (TreeChangeType::Modified { .. }, Some(_)) => Some(ConflictKind::ModifiedBoth),
            (TreeChangeType::Modified { .. }, None) => {
                Some(ConflictKind::ModifiedUpstreamDeletedHere)
            }
        };

        if let Some(kind) = conflict {
            tracing::debug!(path = %path.display(), conflict = kind.describe(), "cherry-pick conflict");
            conflicts.push(PathConflict { path, kind });
        }
    }

    if conflicts.is_empty() {
        Ok(plan)
    } else {
        Err(conflicts)
    }
}
