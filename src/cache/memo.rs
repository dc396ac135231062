//! Lazily recomputed model quantities

use crate::core::Vector;
use std::sync::OnceLock;

/// Memoized value with an explicit stale state.
///
/// Reads take `&self` and may race: each racing reader computes the value and
/// the first one stored wins, so the computation must be deterministic.
/// Invalidation takes `&mut self`, which keeps it from overlapping any read.
#[derive(Debug)]
pub struct Memo<T> {
    cell: OnceLock<T>,
}

impl<T> Memo<T> {
    /// Create a stale memo
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Cached value, if fresh
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Whether the next read has to recompute
    pub fn is_stale(&self) -> bool {
        self.cell.get().is_none()
    }

    /// Return the cached value, or compute, cache and return it
    pub fn get_or_try_compute<E>(&self, compute: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }
        let value = compute()?;
        Ok(self.cell.get_or_init(|| value))
    }

    /// Mark stale
    pub fn invalidate(&mut self) {
        self.cell.take();
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived quantities of a trained model: the weight vector W (linear kernel)
/// and the averaged and quick bias estimates.
#[derive(Debug, Default)]
pub struct ModelCache {
    pub weights: Memo<Vector>,
    pub bias: Memo<f64>,
    pub quick_bias: Memo<f64>,
}

impl ModelCache {
    /// Mark every derived quantity stale
    pub fn invalidate(&mut self) {
        self.weights.invalidate();
        self.bias.invalidate();
        self.quick_bias.invalidate();
    }

    /// Whether every derived quantity is stale
    pub fn is_stale(&self) -> bool {
        self.weights.is_stale() && self.bias.is_stale() && self.quick_bias.is_stale()
    }
}
