use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;

const TODO_HELP: &str = "
# Commands:
# p, pick <commit> = use commit
# r, reword <commit> = use commit, but edit the commit message
# s, squash <commit> = use commit, but meld into previous commit
# d, drop <commit> = remove commit
#
# Lines starting with '#' are ignored, and an empty list aborts the rebase.
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoAction {
    Pick,
    Reword,
    Squash,
    Drop,
}

impl TodoAction {
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "p" | "pick" => Some(TodoAction::Pick),
            "r" | "reword" => Some(TodoAction::Reword),
            "s" | "squash" => Some(TodoAction::Squash),
            "d" | "drop" => Some(TodoAction::Drop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoAction::Pick => "pick",
            TodoAction::Reword => "reword",
            TodoAction::Squash => "squash",
            TodoAction::Drop => "drop",
        }
    }
}

/// One line of the todo list: `<action> <commit> [summary]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoStep {
    action: TodoAction,
    commit: String,
}

impl TodoStep {
    /// `None` for lines with fewer than two fields or an unknown action
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let action = TodoAction::parse(fields.next()?)?;
        let commit = fields.next()?.to_string();

        Some(TodoStep { action, commit })
    }

    pub fn action(&self) -> TodoAction {
        self.action
    }

    /// Commit id or unique prefix as written in the todo
    pub fn commit(&self) -> &str {
        &self.commit
    }
}

/// Initial todo: every commit picked, oldest first
pub fn render_todo(commits: &[(ObjectId, Commit)]) -> String {
    let mut todo = commits
        .iter()
        .map(|(oid, commit)| {
            format!(
                "{} {} {}\n",
                TodoAction::Pick.as_str(),
                oid,
                commit.short_message()
            )
        })
        .collect::<String>();
    todo.push_str(TODO_HELP);

    todo
}

/// Keep the meaningful lines of an edited todo, dropping blanks and comments
pub fn parse_todo(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
