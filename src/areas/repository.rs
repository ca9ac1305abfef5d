use crate::areas::commit_log::CommitLog;
use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::storage::{DiskStorage, Storage};
use crate::areas::workspace::{REPOSITORY_DIR, Workspace};
use crate::artifacts::editor::{Editor, ExternalEditor};
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntries};
use crate::errors::RepositoryError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const OBJECTS_DIR: &str = "objects";
pub const INDEX_FILE: &str = "index";
pub const COMMIT_LOG_FILE: &str = "commits.log";
pub const CONFIG_FILE: &str = "config.toml";
pub const REBASE_STATE_FILE: &str = "rebase-state.json";

/// Handle on one repository; every operation goes through it
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    storage: Rc<dyn Storage>,
    index: RefCell<Index>,
    database: Database,
    commit_log: CommitLog,
    workspace: Workspace,
    refs: Refs,
    config: Config,
    editor: Box<dyn Editor>,
}

impl Repository {
    /// Open (or prepare to initialize) the repository rooted at `path` on disk
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path);
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()))?;

        Ok(Self::with_storage(&path, writer, Rc::new(DiskStorage)))
    }

    /// Build a repository over any storage backend
    pub fn with_storage(
        path: &Path,
        writer: Box<dyn std::io::Write>,
        storage: Rc<dyn Storage>,
    ) -> Self {
        let git_path = path.join(REPOSITORY_DIR);

        let index = Index::new(git_path.join(INDEX_FILE).into_boxed_path(), storage.clone());
        let database = Database::new(git_path.join(OBJECTS_DIR).into_boxed_path(), storage.clone());
        let commit_log =
            CommitLog::new(git_path.join(COMMIT_LOG_FILE).into_boxed_path(), storage.clone());
        let workspace = Workspace::new(path.to_path_buf().into_boxed_path(), storage.clone());
        let refs = Refs::new(git_path.clone().into_boxed_path(), storage.clone());
        let config = Config::new(git_path.join(CONFIG_FILE).into_boxed_path(), storage.clone());
        let editor = ExternalEditor::new(git_path.into_boxed_path());

        Repository {
            path: path.to_path_buf().into_boxed_path(),
            writer: RefCell::new(writer),
            storage,
            index: RefCell::new(index),
            database,
            commit_log,
            workspace,
            refs,
            config,
            editor: Box::new(editor),
        }
    }

    pub fn with_editor(mut self, editor: impl Editor + 'static) -> Self {
        self.editor = Box::new(editor);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> PathBuf {
        self.path.join(REPOSITORY_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_path().join(INDEX_FILE)
    }

    pub fn rebase_state_path(&self) -> PathBuf {
        self.git_path().join(REBASE_STATE_FILE)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn commit_log(&self) -> &CommitLog {
        &self.commit_log
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn editor(&self) -> &dyn Editor {
        self.editor.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.storage.is_file(&self.refs.head_path())
    }

    pub fn require_repository(&self) -> anyhow::Result<()> {
        if !self.is_initialized() {
            return Err(RepositoryError::NotARepository(self.path.to_path_buf()).into());
        }

        Ok(())
    }

    /// Current staged mapping
    pub fn load_index(&self) -> anyhow::Result<TreeEntries> {
        let mut index = self.index.borrow_mut();
        index.rehydrate()?;

        Ok(index.entries().clone())
    }

    pub fn write_index(&self, entries: TreeEntries) -> anyhow::Result<()> {
        let mut index = self.index.borrow_mut();
        index.replace(entries);
        index.write_updates()
    }

    /// Load the index, run `mutate` on it and persist the result only if it succeeds
    ///
    /// `mutate` must not call back into the repository's index accessors.
    pub fn update_index<T>(
        &self,
        mutate: impl FnOnce(&mut Index) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut index = self.index.borrow_mut();
        index.rehydrate()?;

        match mutate(&mut index) {
            Ok(value) => {
                index.write_updates()?;
                Ok(value)
            }
            Err(err) => {
                // drop the half-applied mutation; the file on disk was never touched
                index.rehydrate().ok();
                Err(err)
            }
        }
    }

    pub fn head_commit(&self) -> anyhow::Result<Option<(ObjectId, Commit)>> {
        match self.refs.read_head()? {
            Some(oid) => {
                let commit = self
                    .commit_log
                    .load(&oid)
                    .with_context(|| format!("HEAD points at an unknown commit {}", oid))?;
                Ok(Some((oid, commit)))
            }
            None => Ok(None),
        }
    }

    /// Load a commit that must exist; an unknown id is an invalid commit
    pub fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        self.commit_log.load(oid).map_err(|err| {
            match RepositoryError::kind_of(&err) {
                Some(RepositoryError::UnknownCommit(_)) => {
                    RepositoryError::InvalidCommit(oid.to_string()).into()
                }
                _ => err,
            }
        })
    }

    /// Tree of the HEAD commit; empty before the first commit
    pub fn head_tree(&self) -> anyhow::Result<TreeEntries> {
        match self.head_commit()? {
            Some((_, commit)) => self.commit_tree(&commit),
            None => Ok(TreeEntries::new()),
        }
    }

    pub fn commit_tree(&self, commit: &Commit) -> anyhow::Result<TreeEntries> {
        Ok(self.database.parse_tree(commit.tree_oid())?.into_entries())
    }

    pub fn write_tree(&self, entries: &TreeEntries) -> anyhow::Result<ObjectId> {
        self.database.store(&Tree::new(entries.clone()))
    }

    /// Author for new commits: environment, then config, then defaults
    pub fn author(&self) -> Author {
        Author::resolve(|key| self.config.lookup(key))
    }
}
