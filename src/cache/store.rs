//! Persistent key-value stores backing the response cache
//!
//! A `CacheStore` holds `CacheEntry` records in named collections. `FileStore`
//! persists each entry as a JSON file; `MemoryStore` keeps everything in a map
//! and is what tests substitute for the disk.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur when writing to a cache store
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be encoded as JSON
    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Independent keyed collections within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Paginated problem listings, keyed by page and page size
    ProblemList,
    /// Single problem records, keyed by slug
    ProblemDetail,
}

impl Collection {
    /// All collections, in a stable order
    pub const ALL: [Collection; 2] = [Collection::ProblemList, Collection::ProblemDetail];

    /// Directory name used by the file store
    pub fn name(&self) -> &'static str {
        match self {
            Collection::ProblemList => "problems",
            Collection::ProblemDetail => "problem_details",
        }
    }
}

/// A stored API response together with when it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// Key the entry is stored under
    pub key: String,
    /// The response payload
    pub value: V,
    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

/// A keyed, overwrite-on-write store of cache entries
///
/// Reads never fail: a missing or unreadable entry is a miss.
pub trait CacheStore: Send + Sync {
    /// Reads the entry for `key`, if one exists and can be decoded
    fn read(&self, collection: Collection, key: &str) -> Option<CacheEntry<Value>>;

    /// Writes `entry`, replacing any existing entry with the same key
    fn write(&self, collection: Collection, entry: &CacheEntry<Value>) -> Result<(), CacheError>;

    /// Number of entries currently held in `collection`
    fn len(&self, collection: Collection) -> usize;

    /// Removes every entry from every collection
    fn clear(&self) -> Result<(), CacheError>;
}

/// Stores cache entries as JSON files on disk
///
/// Entries live at `{cache_dir}/{collection}/{key}.json` in an XDG-compliant
/// cache directory (`~/.cache/problemdesk/` on Linux). Keys are percent-encoded
/// so that any slug maps to exactly one file name.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a new FileStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "problemdesk")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new FileStore rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Root directory of the store
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.cache_dir.join(collection.name())
    }

    /// Returns the path of the file holding `key`
    fn entry_path(&self, collection: Collection, key: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{}.json", encode_key(key)))
    }
}

impl CacheStore for FileStore {
    fn read(&self, collection: Collection, key: &str) -> Option<CacheEntry<Value>> {
        let content = fs::read_to_string(self.entry_path(collection, key)).ok()?;
        let entry: CacheEntry<Value> = serde_json::from_str(&content).ok()?;
        // A file that decodes to another key is not this entry
        (entry.key == key).then_some(entry)
    }

    fn write(&self, collection: Collection, entry: &CacheEntry<Value>) -> Result<(), CacheError> {
        fs::create_dir_all(self.collection_dir(collection))?;
        let json = serde_json::to_string_pretty(entry)?;
        fs::write(self.entry_path(collection, &entry.key), json)?;
        Ok(())
    }

    fn len(&self, collection: Collection) -> usize {
        fs::read_dir(self.collection_dir(collection))
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                    .count()
            })
            .unwrap_or(0)
    }

    fn clear(&self) -> Result<(), CacheError> {
        for collection in Collection::ALL {
            match fs::remove_dir_all(self.collection_dir(collection)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Keeps cache entries in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(Collection, String), CacheEntry<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, collection: Collection, key: &str) -> Option<CacheEntry<Value>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&(collection, key.to_string())).cloned()
    }

    fn write(&self, collection: Collection, entry: &CacheEntry<Value>) -> Result<(), CacheError> {
        // A poisoned lock only means another writer panicked mid-insert
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((collection, entry.key.clone()), entry.clone());
        Ok(())
    }

    fn len(&self, collection: Collection) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.keys().filter(|(c, _)| *c == collection).count()
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }
}

/// Maps a cache key to a file-name-safe string
///
/// Bytes outside `[A-Za-z0-9._-]` become `%XX`, so distinct keys never share
/// a file and no key can escape its collection directory.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => encoded.push(byte as char),
            // Leading dots would make hidden files or `..`
            b'.' if !encoded.is_empty() => encoded.push('.'),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
