//! Gaussian (RBF) kernel implementation
//!
//! The kernel is defined as: K(x, y) = exp(-||x - y||² / σ²)
//! where σ (the bandwidth) controls how quickly similarity decays with distance.

use crate::core::Vector;
use crate::kernel::Kernel;

/// Gaussian kernel: K(x, y) = exp(-||x - y||² / σ²)
///
/// The bandwidth controls the "reach" of each training example:
/// - Small bandwidth: only very close points are similar (potential overfitting)
/// - Large bandwidth: distant points still interact (potential underfitting)
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    bandwidth: f64,
}

impl RBFKernel {
    /// Create a new Gaussian kernel with the given bandwidth σ
    ///
    /// # Panics
    /// Panics if bandwidth is not positive
    pub fn new(bandwidth: f64) -> Self {
        assert!(
            bandwidth > 0.0,
            "Bandwidth must be positive, got: {}",
            bandwidth
        );
        Self { bandwidth }
    }

    /// Get the bandwidth parameter
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

impl Default for RBFKernel {
    /// Default Gaussian kernel with σ = 1.0
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &Vector, y: &Vector) -> f64 {
        gaussian(x.as_slice(), y.as_slice(), self.bandwidth)
    }
}

/// exp(-||x - y||² / σ²) without the bandwidth check done by [`RBFKernel::new`]
pub(crate) fn gaussian(x: &[f64], y: &[f64], bandwidth: f64) -> f64 {
    let squared_distance = squared_euclidean_distance(x, y);
    (-squared_distance / bandwidth / bandwidth).exp()
}

/// ||x - y||² for two equally long slices
pub(crate) fn squared_euclidean_distance(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let diff = a - b;
            diff * diff
        })
        .sum()
}
