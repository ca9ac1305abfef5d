use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use anyhow::Context;

pub const HEADS_PREFIX: &str = "refs/heads/";
pub const HEAD_REF_NAME: &str = "HEAD";

/// Ref path relative to the repository directory, e.g. `refs/heads/main` or `HEAD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn new(name: impl Into<String>) -> Self {
        SymRefName(name.into())
    }

    pub fn head() -> Self {
        SymRefName(HEAD_REF_NAME.to_string())
    }

    pub fn is_detached_head(&self) -> bool {
        self.0 == HEAD_REF_NAME
    }

    pub fn as_ref_path(&self) -> &str {
        &self.0
    }

    /// The branch this ref names, if it lives under `refs/heads/`
    pub fn branch_name(&self) -> Option<BranchName> {
        self.0
            .strip_prefix(HEADS_PREFIX)
            .and_then(|name| BranchName::try_parse(name.to_string()).ok())
    }
}

impl std::fmt::Display for SymRefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            anyhow::bail!("branch name cannot be empty");
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            anyhow::bail!("invalid branch name: {}", name);
        }

        Ok(Self(name))
    }

    pub fn to_sym_ref_name(&self) -> SymRefName {
        SymRefName(format!("{HEADS_PREFIX}{}", self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
