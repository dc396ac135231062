//! Kernel values between registered queries and training samples

use crate::cache::CacheStats;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle for a query vector registered with the prediction cache.
///
/// Two structurally equal vectors registered separately get distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(u64);

impl QueryId {
    /// Raw handle value
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PredictionKey {
    query: QueryId,
    sample: usize,
}

/// LRU-bounded cache of K(query, x_sample)
///
/// Lookups go through [`LruCache::peek`], so they take `&self` and the cache can
/// be shared by prediction workers. Recency therefore only reflects insertion
/// order.
pub struct PredictionKernelCache {
    cache: LruCache<PredictionKey, f64>,
    next_query: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PredictionKernelCache {
    /// Create a new prediction cache with specified capacity in number of entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            next_query: 0,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Allocate a fresh query handle
    pub fn register_query(&mut self) -> QueryId {
        let id = QueryId(self.next_query);
        self.next_query += 1;
        id
    }

    /// Store K(query, x_sample)
    pub fn put(&mut self, query: QueryId, sample: usize, value: f64) {
        self.cache.put(PredictionKey { query, sample }, value);
    }

    /// Look up K(query, x_sample)
    pub fn get(&self, query: QueryId, sample: usize) -> Option<f64> {
        match self.cache.peek(&PredictionKey { query, sample }) {
            Some(&value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache holds no values
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }

    /// Drop every cached value and reset the statistics
    ///
    /// Handles issued earlier stay unique; they simply miss from now on.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for PredictionKernelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionKernelCache")
            .field("stats", &self.stats())
            .field("next_query", &self.next_query)
            .finish()
    }
}
