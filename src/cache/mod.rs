//! Kernel and model caches
//!
//! - [`TrainingKernelCache`]: every K(x_i, x_j) over the training set, built once
//!   before the first training round and read-only afterwards.
//! - [`PredictionKernelCache`]: K(query, x_j) for registered query batches, bounded
//!   by an LRU capacity. Misses fall back to evaluating the kernel directly.
//! - [`Memo`] / [`ModelCache`]: lazily recomputed weight vector and bias, marked
//!   stale by every training entry point.

pub mod memo;
pub mod prediction;
pub mod training;

pub use self::memo::*;
pub use self::prediction::*;
pub use self::training::*;

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
