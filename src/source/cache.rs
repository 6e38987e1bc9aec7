//! Extraction result caching
//!
//! Repeated uploads of the same document (same bytes, same options) skip the
//! PDFium/OCR pipeline entirely. Keys are content hashes, so the cache is
//! safe to share across clients.

use crate::pipeline::ExtractionOutcome;
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;

/// Cache key for a document + options combination: SHA-256 of the raw bytes
/// plus an options fingerprint, so `redact=false` and `redact=true` results
/// never collide.
pub fn cache_key(data: &[u8], fingerprint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.update(fingerprint.as_bytes());
    format!("{:x}", hasher.finalize())
}

struct CacheInner {
    lru: LruCache<String, ExtractionOutcome>,
    total_bytes: usize,
}

/// LRU cache of extraction outcomes with entry count and byte budget limits.
/// The byte budget is counted over cached text bytes.
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    max_bytes: usize,
}

impl ResultCache {
    /// Create a new cache with the specified entry capacity and byte budget
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(CacheInner {
                lru: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store an extraction outcome.
    /// Rejects entries larger than max_bytes entirely.
    /// Evicts LRU entries until the byte budget is satisfied.
    pub fn put(&self, key: String, outcome: ExtractionOutcome) {
        let new_size = outcome.text.len();

        // Reject single entries that exceed the entire budget
        if new_size > self.max_bytes {
            return;
        }

        let mut inner = self.inner.lock();

        // If updating an existing key, subtract the old size first
        if let Some(old) = inner.lru.pop(&key) {
            inner.total_bytes = inner.total_bytes.saturating_sub(old.text.len());
        }

        // Evict LRU entries until we have room
        while inner.total_bytes + new_size > self.max_bytes {
            if let Some((_evicted_key, evicted_val)) = inner.lru.pop_lru() {
                inner.total_bytes = inner.total_bytes.saturating_sub(evicted_val.text.len());
            } else {
                break;
            }
        }

        inner.total_bytes += new_size;
        inner.lru.put(key, outcome);
    }

    /// Get a cached outcome
    pub fn get(&self, key: &str) -> Option<ExtractionOutcome> {
        self.inner.lock().lru.get(key).cloned()
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().lru.contains(key)
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Get total text bytes currently cached
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }
}
