use std::collections::HashMap;
use std::fmt::Debug;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Backend that persists whole preference files by key.
///
/// Implementations must make `write` all-or-nothing: a reader either sees the
/// previous contents or the new ones, never a mix.
pub trait Storage: Send + Sync + Debug {
    /// Read data from storage. `Ok(None)` if nothing was ever written.
    fn read(&self, key: &str) -> Result<Option<String>, std::io::Error>;

    /// Write data to storage, replacing any previous contents.
    fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error>;

    /// Get the full path/key for display purposes
    fn get_path(&self, key: &str) -> String;

    /// Process-wide identity of the data behind `key`, used to refuse two
    /// stores over the same file. `None` when every instance is private.
    fn instance_key(&self, _key: &str) -> Result<Option<PathBuf>, std::io::Error> {
        Ok(None)
    }
}

/// Stores each key as a file under a base directory.
#[derive(Debug)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: directory.into(),
        }
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
        let path = self.base_dir.join(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
        let path = self.base_dir.join(key);

        // Ensure parent directory exists
        let parent_dir = path.parent().unwrap_or(&self.base_dir);
        std::fs::create_dir_all(parent_dir)?;

        // Write to temporary file first
        let mut tmp_file = tempfile::NamedTempFile::new_in(parent_dir)?;
        tmp_file.write_all(data.as_bytes())?;
        tmp_file.as_file().sync_all()?;

        // Atomically move temp file to final location
        tmp_file.persist(&path).map_err(|e| e.error)?;
        tracing::trace!(path = %path.display(), bytes = data.len(), "preferences file replaced");

        Ok(())
    }

    fn get_path(&self, key: &str) -> String {
        self.base_dir.join(key).display().to_string()
    }

    /// Canonical path of the file, so `dir`, `dir/.` and symlinks agree.
    /// Creates the base directory, which must exist to be canonicalized.
    fn instance_key(&self, key: &str) -> Result<Option<PathBuf>, std::io::Error> {
        std::fs::create_dir_all(&self.base_dir)?;
        let base = std::fs::canonicalize(&self.base_dir)?;
        Ok(Some(base.join(key)))
    }
}

/// Keeps everything in process memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, std::io::Error> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| std::io::Error::other("memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, data: &str) -> Result<(), std::io::Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| std::io::Error::other("memory storage lock poisoned"))?;
        entries.insert(key.to_string(), data.to_string());
        Ok(())
    }

    fn get_path(&self, key: &str) -> String {
        format!("memory::{}", key)
    }
}

/// File-backed storage rooted at `directory`.
pub fn create_storage(directory: impl Into<PathBuf>) -> Box<dyn Storage> {
    Box::new(FileStorage::new(directory))
}
