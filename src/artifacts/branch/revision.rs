use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::{MIN_PREFIX_LENGTH, OBJECT_ID_LENGTH};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;

/// A revision naming one commit.
///
/// Supported formats:
/// - Ref names: `main`, `feature/new-feature`, `v1.0` (tags), `HEAD`
/// - Aliases: `@` (resolves to `HEAD`)
/// - Full or abbreviated commit ids (at least 4 hex characters)
/// - Parent notation: `<revision>^`
/// - Ancestor notation: `<revision>~<n>`
///
/// Id-like names are parsed as `Ref` and only looked up in the commit log when
/// no ref of that name exists, so refs win over id prefixes.
#[derive(Debug, Clone)]
pub enum Revision {
    Ref(BranchName),
    Ancestor(Box<Revision>, usize),
    Parent(Box<Revision>),
}

impl Revision {
    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<ObjectId> {
        match self {
            Revision::Ref(name) => Self::resolve_name(name.as_ref(), repository),
            Revision::Parent(base) => Self::parent_of(base.resolve(repository)?, self, repository),
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::parent_of(oid, self, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_name(name: &str, repository: &Repository) -> anyhow::Result<ObjectId> {
        if let Some(oid) = repository.refs().read_ref(name)? {
            return Ok(oid);
        }

        if !Self::looks_like_oid(name) {
            return Err(RepositoryError::InvalidCommit(name.to_string()).into());
        }

        match repository.commit_log().find_commit(name) {
            Ok((oid, _)) => Ok(oid),
            Err(err) => match RepositoryError::kind_of(&err) {
                Some(RepositoryError::UnknownCommit(_)) => {
                    Err(RepositoryError::InvalidCommit(name.to_string()).into())
                }
                _ => Err(err),
            },
        }
    }

    fn parent_of(
        oid: ObjectId,
        revision: &Revision,
        repository: &Repository,
    ) -> anyhow::Result<ObjectId> {
        let commit = repository
            .commit_log()
            .load(&oid)
            .with_context(|| format!("unable to resolve {}", revision))?;

        commit
            .parent()
            .cloned()
            .ok_or_else(|| RepositoryError::InvalidCommit(revision.to_string()).into())
    }

    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent_regex = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        let ancestor_regex = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;

        if let Some(caps) = parent_regex.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;

            Ok(Revision::Parent(Box::new(base_revision)))
        } else if let Some(caps) = ancestor_regex.captures(revision) {
            let generations: usize = caps[2]
                .parse()
                .with_context(|| format!("failed to parse generations in revision: {revision}"))?;
            let base_revision = Self::try_parse(&caps[1])?;

            Ok(Revision::Ancestor(Box::new(base_revision), generations))
        } else {
            let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
            let branch_name = BranchName::try_parse(resolved_name.to_string())?;

            Ok(Revision::Ref(branch_name))
        }
    }

    fn looks_like_oid(name: &str) -> bool {
        (MIN_PREFIX_LENGTH..=OBJECT_ID_LENGTH).contains(&name.len())
            && name.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Ref(name) => write!(f, "{}", name),
            Revision::Parent(base) => write!(f, "{}^", base),
            Revision::Ancestor(base, generations) => write!(f, "{}~{}", base, generations),
        }
    }
}

impl Repository {
    /// Resolve a revision expression to a commit id; anything unresolvable is `InvalidCommit`
    pub fn resolve_revision(&self, revision: &str) -> anyhow::Result<ObjectId> {
        let parsed = Revision::try_parse(revision)
            .map_err(|_| RepositoryError::InvalidCommit(revision.to_string()))?;

        parsed.resolve(self)
    }
}
