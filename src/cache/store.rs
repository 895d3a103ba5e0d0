//! JSON-file backed result cache.
//!
//! Entries map a query fingerprint (see [`crate::hashing::fingerprint`]) to the
//! [`Candidate`] a source returned for it. Only hits are stored.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::error::{CacheError, CacheResult};
use crate::sources::Candidate;

/// On-disk format version written to the envelope.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    entries: HashMap<String, Candidate>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    entries: BTreeMap<&'a str, &'a Candidate>,
}

/// Fingerprint → candidate map with optional JSON persistence.
pub struct ResultCache {
    path: Option<PathBuf>,
    persist_on_write: bool,
    entries: Mutex<HashMap<String, Candidate>>,
    write_lock: Mutex<()>,
}

impl ResultCache {
    /// Creates a cache that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            persist_on_write: false,
            entries: Mutex::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the cache at `path`.
    ///
    /// A missing file yields an empty cache. An unreadable or corrupt file is logged and
    /// also yields an empty cache; it is overwritten on the next persist.
    pub fn load(path: impl Into<PathBuf>, persist_on_write: bool) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => {
                debug!(path = %path.display(), entries = entries.len(), "Loaded result cache");
                entries
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Ignoring unreadable result cache");
                HashMap::new()
            }
        };

        Self {
            path: Some(path),
            persist_on_write,
            entries: Mutex::new(entries),
            write_lock: Mutex::new(()),
        }
    }

    /// Like [`ResultCache::load`] but surfaces read and parse failures.
    pub fn try_load(path: impl Into<PathBuf>, persist_on_write: bool) -> CacheResult<Self> {
        let path = path.into();
        let entries = Self::read_entries(&path)?;
        Ok(Self {
            path: Some(path),
            persist_on_write,
            entries: Mutex::new(entries),
            write_lock: Mutex::new(()),
        })
    }

    fn read_entries(path: &Path) -> CacheResult<HashMap<String, Candidate>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let bytes = fs::read(path)?;
        let file: CacheFile = serde_json::from_slice(&bytes)?;
        if file.version != CACHE_FORMAT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: file.version,
            });
        }
        Ok(file.entries)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, fingerprint: &str) -> Option<Candidate> {
        self.entries.lock().get(fingerprint).cloned()
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.lock().contains_key(fingerprint)
    }

    /// Stores a hit. With `persist_on_write`, the file is rewritten immediately; a failed
    /// write is logged and the in-memory entry is kept.
    pub fn insert(&self, fingerprint: impl Into<String>, candidate: Candidate) {
        self.entries.lock().insert(fingerprint.into(), candidate);

        if self.persist_on_write {
            if let Err(err) = self.persist() {
                warn!(error = %err, "Failed to persist result cache");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Writes the whole cache to disk atomically (temp file in the same directory, then
    /// rename). No-op for in-memory caches.
    pub fn persist(&self) -> CacheResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let _guard = self.write_lock.lock();

        let json = {
            let entries = self.entries.lock();
            let envelope = CacheFileRef {
                version: CACHE_FORMAT_VERSION,
                entries: entries.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            };
            serde_json::to_vec_pretty(&envelope)?
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| CacheError::Io(e.error))?;

        debug!(path = %path.display(), bytes = json.len(), "Persisted result cache");
        Ok(())
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("path", &self.path)
            .field("persist_on_write", &self.persist_on_write)
            .field("entries", &self.len())
            .finish()
    }
}

#[derive(Clone)]
/// Shared handle to a [`ResultCache`].
pub struct CacheHandle {
    inner: Arc<ResultCache>,
}

impl CacheHandle {
    pub fn new(cache: ResultCache) -> Self {
        Self {
            inner: Arc::new(cache),
        }
    }

    /// Handle to a fresh in-memory cache.
    pub fn in_memory() -> Self {
        Self::new(ResultCache::in_memory())
    }

    /// Loads the cache at `path` (see [`ResultCache::load`]).
    pub fn load(path: impl Into<PathBuf>, persist_on_write: bool) -> Self {
        Self::new(ResultCache::load(path, persist_on_write))
    }

    #[inline]
    pub fn get(&self, fingerprint: &str) -> Option<Candidate> {
        self.inner.get(fingerprint)
    }

    #[inline]
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.inner.contains(fingerprint)
    }

    #[inline]
    pub fn insert(&self, fingerprint: impl Into<String>, candidate: Candidate) {
        self.inner.insert(fingerprint, candidate)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn persist(&self) -> CacheResult<()> {
        self.inner.persist()
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path()
    }

    /// Returns the number of strong references to the underlying cache.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Default for CacheHandle {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("cache", &self.inner)
            .field("strong_count", &self.strong_count())
            .finish()
    }
}
