//! External metadata cache backends.
//!
//! The metadata registry keeps built metadata in-process; a [`MetadataCache`]
//! is an optional second level that can outlive one registry (shared between
//! serializers, or backed by an external store). Entries are JSON text.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Characters a cache key may not contain.
pub const RESERVED_KEY_CHARACTERS: &str = "{}()/\\@";

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The key is empty or contains reserved characters
    #[error("Cache key \"{0}\" contains reserved characters {{}}()/\\@")]
    InvalidKey(String),

    /// Failed to acquire lock
    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    /// The backend rejected the operation
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// One cache entry as returned by [`MetadataCache::get_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem {
    key: String,
    value: Option<String>,
    hit: bool,
}

impl CacheItem {
    /// A miss for `key`.
    pub fn miss(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            hit: false,
        }
    }

    /// A hit for `key` holding `value`.
    pub fn hit(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            hit: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_hit(&self) -> bool {
        self.hit
    }

    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub fn into_value(self) -> Option<String> {
        self.value
    }
}

/// A key/value store for serialized class metadata.
pub trait MetadataCache: Send + Sync {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem>;

    fn save(&self, item: CacheItem) -> CacheResult<()>;
}

/// Validate a cache key.
pub fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() || key.chars().any(|c| RESERVED_KEY_CHARACTERS.contains(c)) {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// A cache that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetadataCache;

impl MetadataCache for NoopMetadataCache {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
        Ok(CacheItem::miss(key))
    }

    fn save(&self, _item: CacheItem) -> CacheResult<()> {
        Ok(())
    }
}

/// Thread-safe bounded in-memory cache.
#[derive(Debug)]
pub struct LruMetadataCache {
    entries: Mutex<LruCache<String, String>>,
}

impl Default for LruMetadataCache {
    fn default() -> Self {
        Self::new(256)
    }
}

impl LruMetadataCache {
    /// Create a cache holding at most `max_entries` classes.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataCache for LruMetadataCache {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
        validate_key(key)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheError::LockError(e.to_string()))?;

        Ok(match entries.get(key) {
            Some(value) => {
                tracing::trace!(key, "metadata cache hit");
                CacheItem::hit(key, value.clone())
            }
            None => CacheItem::miss(key),
        })
    }

    fn save(&self, item: CacheItem) -> CacheResult<()> {
        validate_key(item.key())?;
        let key = item.key().to_string();
        let Some(value) = item.into_value() else {
            return Ok(());
        };

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| CacheError::LockError(e.to_string()))?;
        entries.put(key, value);
        Ok(())
    }
}
