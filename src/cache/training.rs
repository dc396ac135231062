//! Dense kernel matrix over the training set

use crate::core::Vector;
use crate::kernel::Kernel;

/// Row-major N x N matrix of K(x_i, x_j) for every ordered pair of samples.
///
/// Built by a single writer before any training worker starts; afterwards it is
/// only read, so it can be shared across threads by reference.
#[derive(Debug, Clone, Default)]
pub struct TrainingKernelCache {
    n: usize,
    values: Vec<f64>,
}

impl TrainingKernelCache {
    /// Evaluate the kernel for every ordered pair (i, j)
    pub fn build<'a, K, I>(kernel: &K, vectors: I) -> Self
    where
        K: Kernel + ?Sized,
        I: IntoIterator<Item = &'a Vector>,
    {
        let vectors: Vec<&Vector> = vectors.into_iter().collect();
        let n = vectors.len();
        let mut values = Vec::with_capacity(n * n);

        for xk in &vectors {
            for xj in &vectors {
                values.push(kernel.compute(xk, xj));
            }
        }

        Self { n, values }
    }

    /// Number of samples the cache was built for
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the cache holds no samples
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// K(x_i, x_j), or `None` if either index is outside the cached set
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.n && j < self.n {
            Some(self.values[i * self.n + j])
        } else {
            None
        }
    }

    /// All K(x_i, x_j) for a fixed i
    ///
    /// # Panics
    /// Panics if i >= len()
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }
}
