//! Kernel trait definition

use crate::core::Vector;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
/// Implementations are stateless: identical inputs give bit-identical outputs,
/// and `compute(x, y) == compute(y, x)`.
///
/// Both vectors must have the same rank. Callers validate ranks before handing
/// vectors to a kernel; the optimizer does this when samples and queries enter it.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &Vector, y: &Vector) -> f64;
}
