pub mod inspector;
pub mod status_info;

use colored::Colorize;

const LABEL_WIDTH: usize = 8;

/// How a tracked file on disk compares to its index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WorkspaceChangeType {
    #[default]
    None,
    Modified,
    Deleted,
}

impl WorkspaceChangeType {
    pub fn short_code(&self) -> &'static str {
        match self {
            WorkspaceChangeType::None => " ",
            WorkspaceChangeType::Modified => "M",
            WorkspaceChangeType::Deleted => "D",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            WorkspaceChangeType::None => "",
            WorkspaceChangeType::Modified => "modified:   ",
            WorkspaceChangeType::Deleted => "deleted:    ",
        }
    }
}

impl std::fmt::Display for WorkspaceChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>width$}{}", "", self.label().red(), width = LABEL_WIDTH)
    }
}

/// How an index entry compares to HEAD's tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum IndexChangeType {
    #[default]
    None,
    Added,
    Modified,
    Deleted,
}

impl IndexChangeType {
    pub fn short_code(&self) -> &'static str {
        match self {
            IndexChangeType::None => " ",
            IndexChangeType::Added => "A",
            IndexChangeType::Modified => "M",
            IndexChangeType::Deleted => "D",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            IndexChangeType::None => "",
            IndexChangeType::Added => "new file:   ",
            IndexChangeType::Modified => "modified:   ",
            IndexChangeType::Deleted => "deleted:    ",
        }
    }
}

impl std::fmt::Display for IndexChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>width$}{}", "", self.label().green(), width = LABEL_WIDTH)
    }
}
