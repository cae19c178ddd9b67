//! Generated-sentence cache.
//!
//! The cache is a flat mapping from rendered cache keys to sentence sets. It
//! is rewritten in full on every store; there is no locking, so two processes
//! writing at once may drop each other's entries.
//!
//! Entries are kept as raw JSON values and decoded one at a time, so an entry
//! that is not a `{상, 중, 하}` set only affects its own key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::model::SentenceSet;

/// Default location of the cache file, relative to the working directory.
pub const DEFAULT_CACHE_FILE: &str = "data/generated_cache.json";

/// The full cache contents, keyed by rendered cache key. Values are kept raw.
pub type CacheMap = BTreeMap<String, Value>;

/// Decode one raw cache value. A value that is not a sentence set is logged
/// and treated as absent.
pub fn decode_entry(key: &str, value: &Value) -> Option<SentenceSet> {
    match SentenceSet::deserialize(value) {
        Ok(set) => Some(set),
        Err(e) => {
            warn!(key, error = %e, "ignoring cache entry that is not a sentence set");
            None
        }
    }
}

/// Storage for generated sentence sets.
///
/// Implementors only provide whole-mapping `load` and `save`; `get` and `put`
/// are layered on top of them.
pub trait CacheStore: Send + Sync {
    /// Load the persisted mapping, or an empty one if nothing is stored yet.
    fn load(&self) -> Result<CacheMap>;

    /// Replace the persisted mapping.
    fn save(&self, map: &CacheMap) -> Result<()>;

    /// Look up one entry. Re-reads storage on every call.
    /// An entry that does not decode is a miss.
    fn get(&self, key: &str) -> Result<Option<SentenceSet>> {
        Ok(self
            .load()?
            .get(key)
            .and_then(|value| decode_entry(key, value)))
    }

    /// Insert or replace one entry and persist the whole mapping. Other
    /// entries are written back untouched.
    fn put(&self, key: &str, value: SentenceSet) -> Result<()> {
        let mut map = self.load()?;
        let value = serde_json::to_value(value).context("failed to serialize cache entry")?;
        map.insert(key.to_string(), value);
        self.save(&map)
    }
}

/// Cache stored as one pretty-printed UTF-8 JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonFileCache {
    fn load(&self) -> Result<CacheMap> {
        if !self.path.exists() {
            return Ok(CacheMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read cache: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse cache: {}", self.path.display()))
    }

    fn save(&self, map: &CacheMap) -> Result<()> {
        let json = serde_json::to_string_pretty(map).context("failed to serialize cache")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write cache to {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process cache, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    map: Mutex<CacheMap>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn load(&self) -> Result<CacheMap> {
        Ok(self
            .map
            .lock()
            .map_err(|_| anyhow::anyhow!("cache mutex poisoned"))?
            .clone())
    }

    fn save(&self, map: &CacheMap) -> Result<()> {
        *self
            .map
            .lock()
            .map_err(|_| anyhow::anyhow!("cache mutex poisoned"))? = map.clone();
        Ok(())
    }
}
