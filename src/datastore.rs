//! Durable, observable preference store.
//!
//! A [`DataStore`] owns one preference file (`<name>.toml`) inside a
//! [`Storage`] backend. Reads are served from an in-memory snapshot; writes go
//! through [`DataStore::edit`], which persists the new snapshot with an atomic
//! file replace before publishing it to subscribers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tokio::sync::watch;

use crate::error::{LoadError, StoreError};
use crate::preferences::{MutablePreferences, Preferences};
use crate::storage::{FileStorage, Storage};
use crate::subscription::Subscription;

// Backing files currently owned by an open store, keyed by canonical path.
static OPEN_FILES: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Releases the backing file slot when the last store handle is dropped.
#[derive(Debug)]
struct InstanceGuard {
    path: PathBuf,
}

impl InstanceGuard {
    fn acquire(path: PathBuf) -> Result<Self, LoadError> {
        let mut open = OPEN_FILES
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !open.insert(path.clone()) {
            return Err(LoadError::InstanceAlreadyLoaded);
        }
        Ok(Self { path })
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        let mut open = OPEN_FILES
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        open.remove(&self.path);
    }
}

/// What to do when the preference file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptionPolicy {
    /// Fail [`DataStore::open`] with [`LoadError::DeserializationError`].
    #[default]
    Fail,
    /// Start from an empty snapshot. The file is replaced by the next write.
    ResetToDefaults,
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub corruption: CorruptionPolicy,
    /// Reject a second store for the same backing file in this process.
    /// Backends without an [`instance_key`](Storage::instance_key) are exempt.
    pub single_instance: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            corruption: CorruptionPolicy::default(),
            single_instance: true,
        }
    }
}

#[derive(Debug)]
struct Inner {
    storage: Arc<dyn Storage>,
    file_name: String,
    state: watch::Sender<Preferences>,
    write_lock: Arc<tokio::sync::Mutex<()>>,
    _instance: Option<InstanceGuard>,
    _temp_dir: Option<tempfile::TempDir>,
}

/// Cheaply cloneable handle; all clones share the same snapshot and writers.
#[derive(Debug, Clone)]
pub struct DataStore {
    inner: Arc<Inner>,
}

impl DataStore {
    /// Opens `<name>.toml` in the per-user configuration directory for
    /// `namespace` (e.g. `"com.example.App"`).
    pub fn open(namespace: &str, name: &str) -> Result<Self, LoadError> {
        let project =
            directories::ProjectDirs::from("", "", namespace).ok_or(LoadError::NoConfigDir)?;
        Self::open_in(project.config_dir(), name)
    }

    /// Opens `<name>.toml` inside `directory`. The directory is created if
    /// missing; the file itself appears on first write.
    pub fn open_in(directory: impl AsRef<Path>, name: &str) -> Result<Self, LoadError> {
        let storage = Arc::new(FileStorage::new(directory.as_ref()));
        Self::open_with(storage, name, StoreOptions::default())
    }

    /// Opens a store backed by a fresh temporary directory. Bypasses the
    /// single-instance check, so tests can open as many as they like.
    pub fn open_testing(name: &str) -> Result<Self, LoadError> {
        let dir = tempfile::tempdir()?;
        let storage = Arc::new(FileStorage::new(dir.path()));
        let options = StoreOptions {
            single_instance: false,
            ..StoreOptions::default()
        };
        Self::build(storage, name, options, Some(dir))
    }

    pub fn open_with(
        storage: Arc<dyn Storage>,
        name: &str,
        options: StoreOptions,
    ) -> Result<Self, LoadError> {
        Self::build(storage, name, options, None)
    }

    fn build(
        storage: Arc<dyn Storage>,
        name: &str,
        options: StoreOptions,
        temp_dir: Option<tempfile::TempDir>,
    ) -> Result<Self, LoadError> {
        let file_name = format!("{}.toml", name);
        let location = storage.get_path(&file_name);

        let instance = match storage.instance_key(&file_name)? {
            Some(key) if options.single_instance => Some(InstanceGuard::acquire(key)?),
            _ => None,
        };

        let initial = match storage.read(&file_name)? {
            None => {
                tracing::debug!(path = %location, "no preferences file yet; starting empty");
                Preferences::new()
            }
            Some(contents) => match Preferences::from_toml(&contents) {
                Ok(prefs) => prefs,
                Err(e) => match options.corruption {
                    CorruptionPolicy::Fail => {
                        return Err(LoadError::DeserializationError(location, e));
                    }
                    CorruptionPolicy::ResetToDefaults => {
                        tracing::warn!(path = %location, error = %e, "corrupt preferences file; using defaults");
                        Preferences::new()
                    }
                },
            },
        };
        tracing::info!(path = %location, keys = initial.len(), "preferences loaded");

        let (state, _) = watch::channel(initial);
        Ok(Self {
            inner: Arc::new(Inner {
                storage,
                file_name,
                state,
                write_lock: Arc::new(tokio::sync::Mutex::new(())),
                _instance: instance,
                _temp_dir: temp_dir,
            }),
        })
    }

    /// Current snapshot, without subscribing.
    pub fn snapshot(&self) -> Preferences {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to the raw snapshot stream.
    pub fn data(&self) -> Subscription<Preferences> {
        self.observe(Preferences::clone)
    }

    /// Subscribes to a projection of the snapshot stream.
    pub fn observe<T, F>(&self, map: F) -> Subscription<T>
    where
        F: Fn(&Preferences) -> T + Send + Sync + 'static,
    {
        Subscription::new(self.inner.state.subscribe(), map)
    }

    /// Applies `transform` to a copy of the current snapshot and commits it.
    ///
    /// Edits are serialized: the transform always sees the result of the
    /// previous edit. The new snapshot is published only after it has been
    /// persisted; on error nothing changes. An edit that leaves every value
    /// as it was neither touches the file nor notifies subscribers.
    ///
    /// Once the write has started it runs to completion on its own task, so
    /// dropping the returned future never leaves the file and the snapshot
    /// disagreeing. The write lock is held until the commit is published.
    pub async fn edit<F>(&self, transform: F) -> Result<Preferences, StoreError>
    where
        F: FnOnce(&mut MutablePreferences),
    {
        let writer = Arc::clone(&self.inner.write_lock).lock_owned().await;

        let current = self.snapshot();
        let mut draft = current.to_mutable();
        transform(&mut draft);
        let updated = draft.freeze();

        if updated == current {
            tracing::debug!(file = %self.inner.file_name, "edit left preferences unchanged");
            return Ok(current);
        }

        let contents = updated.to_toml()?;
        let inner = Arc::clone(&self.inner);
        let commit = tokio::spawn(async move {
            let _writer = writer;
            let storage = Arc::clone(&inner.storage);
            let file_name = inner.file_name.clone();
            tokio::task::spawn_blocking(move || storage.write(&file_name, &contents))
                .await
                .map_err(|e| StoreError::Background(e.to_string()))??;

            inner.state.send_replace(updated.clone());
            tracing::debug!(file = %inner.file_name, keys = updated.len(), "preferences committed");
            Ok::<_, StoreError>(updated)
        });
        commit
            .await
            .map_err(|e| StoreError::Background(e.to_string()))?
    }

    /// Display path of the backing file.
    pub fn file_path(&self) -> String {
        self.inner.storage.get_path(&self.inner.file_name)
    }
}
