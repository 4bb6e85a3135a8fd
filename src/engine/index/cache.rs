//! Bounded, concurrent memoization of built indexes.
//!
//! Each container type gets its own [`moka`] cache keyed by
//! `(dictionary id, container path)`. Construction goes through
//! `try_get_with`, which runs at most one build per key: concurrent callers
//! for the same key block on the in-flight build and share its result. A
//! failed build is handed to every waiter and nothing is inserted, so the
//! next request retries.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::sync::Arc;

use log::{debug, info};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use crate::engine::types::error::{EngineError, Result, SourceResult};
use crate::engine::types::filetypes::{FileType, Mdd, Mdx};
use crate::engine::types::models::DictId;

/// Cache key: a dictionary id and the absolute path of one container.
///
/// Re-pointing a dictionary at a different file yields a different key, so
/// stale entries simply age out.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub dict_id: DictId,
    pub path: PathBuf,
}

impl CacheKey {
    pub fn new(dict_id: DictId, path: impl AsRef<Path>) -> Self {
        Self {
            dict_id,
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of index builds started (successful or not).
    pub builds: u64,
    /// Requests served from an already-built index.
    pub hits: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct AtomicCacheStats {
    builds: AtomicU64,
    hits: AtomicU64,
    evictions: AtomicU64,
}

impl AtomicCacheStats {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            builds: self.builds.load(Relaxed),
            hits: self.hits.load(Relaxed),
            evictions: self.evictions.load(Relaxed),
        }
    }
}

/// LRU cache for the indexes of one container type.
pub struct TypedCache<T: FileType> {
    cache: Cache<CacheKey, Arc<T::Index>>,
    stats: Arc<AtomicCacheStats>,
}

impl<T: FileType> TypedCache<T> {
    fn with_capacity(capacity: u64) -> Self {
        let stats = Arc::new(AtomicCacheStats::default());
        let eviction_stats = Arc::clone(&stats);
        let cache = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |key: Arc<CacheKey>, _value, cause| {
                if cause.was_evicted() {
                    debug!(
                        "Evicted {} index for dictionary {} ({})",
                        T::DEBUG_NAME,
                        key.dict_id,
                        key.path.display()
                    );
                    eviction_stats.evictions.fetch_add(1, Relaxed);
                }
            })
            .build();
        Self { cache, stats }
    }

    /// Returns the cached index for `key`, running `build` if it is absent.
    ///
    /// `build` runs on the calling thread and always completes once started;
    /// callers that arrive meanwhile wait for it instead of building again.
    pub fn get_or_build<F>(&self, key: CacheKey, build: F) -> Result<Arc<T::Index>>
    where
        F: FnOnce() -> SourceResult<T::Index>,
    {
        let path = key.path.clone();
        let dict_id = key.dict_id;
        let mut built = false;
        let result = self.cache.try_get_with(key, || {
            built = true;
            self.stats.builds.fetch_add(1, Relaxed);
            info!(
                "Building {} index for dictionary {}: {}",
                T::DEBUG_NAME,
                dict_id,
                path.display()
            );
            build().map(Arc::new)
        });
        if !built {
            self.stats.hits.fetch_add(1, Relaxed);
        }
        result.map_err(|source| EngineError::DecodeFailure { path, source })
    }

    /// Drops every cached index belonging to `dict_id`.
    pub fn invalidate_dictionary(&self, dict_id: DictId) {
        let keys: Vec<Arc<CacheKey>> = self
            .cache
            .iter()
            .filter(|(key, _)| key.dict_id == dict_id)
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            self.cache.invalidate(key.as_ref());
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Number of resident indexes, after applying pending evictions.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

impl<T: FileType> std::fmt::Debug for TypedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("type", &T::DEBUG_NAME)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

/// The engine's index caches: headword indexes and packed-asset indexes.
#[derive(Debug)]
pub struct IndexCache {
    pub headwords: TypedCache<Mdx>,
    pub assets: TypedCache<Mdd>,
}

impl IndexCache {
    pub fn new(headword_capacity: u64, asset_capacity: u64) -> Self {
        Self {
            headwords: TypedCache::with_capacity(headword_capacity),
            assets: TypedCache::with_capacity(asset_capacity),
        }
    }

    pub fn invalidate_dictionary(&self, dict_id: DictId) {
        self.headwords.invalidate_dictionary(dict_id);
        self.assets.invalidate_dictionary(dict_id);
    }
}
