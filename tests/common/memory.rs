use kit::areas::repository::Repository;
use kit::areas::storage::MemoryStorage;
use kit::artifacts::editor::Editor;
use kit::artifacts::objects::object_id::ObjectId;
use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

pub const ROOT: &str = "/repo";

/// Captures everything a repository prints
#[derive(Clone, Default)]
pub struct Output(Rc<RefCell<Vec<u8>>>);

impl Output {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct MemoryRepository {
    pub repository: Repository,
    pub storage: Rc<MemoryStorage>,
    pub output: Output,
}

impl std::ops::Deref for MemoryRepository {
    type Target = Repository;

    fn deref(&self) -> &Self::Target {
        &self.repository
    }
}

impl MemoryRepository {
    pub fn write(&self, path: &str, content: &str) {
        self.workspace()
            .write_file(Path::new(path), content.as_bytes())
            .expect("Failed to write file");
    }

    pub fn read(&self, path: &str) -> String {
        let bytes = self
            .workspace()
            .read_file(Path::new(path))
            .expect("Failed to read file");

        String::from_utf8_lossy(&bytes).to_string()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.workspace().is_file(Path::new(path))
    }

    pub fn stage(&self, paths: &[&str]) {
        let paths = paths.iter().map(|path| path.to_string()).collect::<Vec<_>>();
        self.add(&paths).expect("Failed to stage files");
    }

    /// Stage everything and commit it
    pub fn commit_all(&self, message: &str) -> ObjectId {
        self.stage(&["."]);
        self.commit(message, false).expect("Failed to commit")
    }

    pub fn head(&self) -> ObjectId {
        self.refs()
            .read_head()
            .expect("Failed to read HEAD")
            .expect("HEAD has no commit")
    }

    /// Commit messages from HEAD back to the root, newest first
    pub fn history(&self) -> Vec<String> {
        self.commit_log()
            .ancestors(&self.head())
            .expect("Failed to walk history")
            .into_iter()
            .map(|(_, commit)| commit.message().to_string())
            .collect()
    }
}

/// An initialized in-memory repository whose editor hands text back unchanged
pub fn memory_repository() -> MemoryRepository {
    memory_repository_with_editor(|_: &str, content: &str| -> anyhow::Result<String> {
        Ok(content.to_string())
    })
}

pub fn memory_repository_with_editor(editor: impl Editor + 'static) -> MemoryRepository {
    let storage = Rc::new(MemoryStorage::new());
    let output = Output::default();

    let repository = Repository::with_storage(
        Path::new(ROOT),
        Box::new(output.clone()),
        storage.clone(),
    )
    .with_editor(editor);
    repository.init().expect("Failed to init repository");

    MemoryRepository {
        repository,
        storage,
        output,
    }
}
