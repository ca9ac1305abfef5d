use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntries;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChangeType {
    Added(ObjectId),
    Deleted(ObjectId),
    Modified { old: ObjectId, new: ObjectId },
}

impl TreeChangeType {
    pub fn from_entries(old: Option<&ObjectId>, new: Option<&ObjectId>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(TreeChangeType::Added(new.clone())),
            (Some(old), None) => Some(TreeChangeType::Deleted(old.clone())),
            (Some(old), Some(new)) if old != new => Some(TreeChangeType::Modified {
                old: old.clone(),
                new: new.clone(),
            }),
            _ => None,
        }
    }
}

/// Per-path changes turning `old` into `new`, in path order
pub fn compare(old: &TreeEntries, new: &TreeEntries) -> BTreeMap<PathBuf, TreeChangeType> {
    old.keys()
        .chain(new.keys())
        .filter_map(|path| {
            TreeChangeType::from_entries(old.get(path), new.get(path))
                .map(|change| (path.clone(), change))
        })
        .collect()
}
