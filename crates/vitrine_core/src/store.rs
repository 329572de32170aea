//! Persisted key-value state
//!
//! String-keyed, string-valued storage shared by every component. Reads
//! happen at initialization and writes on each explicit user change; the last
//! write wins and no locking beyond the backend's own is needed.
//!
//! - [`MemoryStore`]: process-local map, optionally "unavailable" to exercise
//!   failure paths
//! - [`FileStore`]: one JSON object on disk, rewritten atomically

use crate::error::{StoreError, StoreResult};
use crate::sync::lock;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Environment variable overriding the state directory
pub const STATE_DIR_ENV: &str = "VITRINE_STATE_DIR";

/// File name used inside the state directory
pub const SETTINGS_FILE: &str = "settings.json";

/// A string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with entries
    pub fn with_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let store = Self::new();
        lock(&store.entries).extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    /// A store whose every operation fails, like disabled browser storage
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_unavailable(true);
        store
    }

    /// Toggle failure mode at runtime
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        lock(&self.entries).clone()
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("storage disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check()?;
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check()?;
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check()?;
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// JSON-file store
///
/// The file holds a single object of string values. Every read goes to disk
/// so external edits are picked up; a corrupt file reads as
/// [`StoreError::Corrupt`] and is replaced wholesale by the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at the default location
    ///
    /// Priority order:
    /// 1. `VITRINE_STATE_DIR` environment variable
    /// 2. The platform configuration directory
    pub fn at_default_location() -> StoreResult<Self> {
        Ok(Self::new(default_state_dir()?.join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> StoreResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(map)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify<F>(&self, edit: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = lock(&self.write_lock);
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StoreError::Corrupt(e)) => {
                tracing::warn!(
                    "discarding corrupt settings file {}: {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        edit(&mut map);
        self.write_map(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.modify(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.modify(|map| {
            map.remove(key);
        })
    }
}

/// Resolve the directory holding persisted settings
pub fn default_state_dir() -> StoreResult<PathBuf> {
    if let Ok(custom) = std::env::var(STATE_DIR_ENV) {
        return Ok(PathBuf::from(custom));
    }
    ProjectDirs::from("dev", "vitrine", "vitrine")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| StoreError::Unavailable("no home directory".into()))
}
