//! Linear kernel implementation

use crate::core::Vector;
use crate::kernel::Kernel;

/// Linear kernel: K(x, y) = x^T * y
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: &Vector, y: &Vector) -> f64 {
        dot_product_dense(x.as_slice(), y.as_slice())
    }
}

/// Dot product of two equally long slices
pub(crate) fn dot_product_dense(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_kernel_basic() {
        let kernel = LinearKernel::new();

        let x = Vector::new(vec![1.0, 0.0, 2.0]);
        let y = Vector::new(vec![0.0, 1.0, 2.0]);

        // Only the last component overlaps: 2.0 * 2.0 = 4.0
        assert_eq!(kernel.compute(&x, &y), 4.0);
    }

    #[test]
    fn test_linear_kernel_identical() {
        let kernel = LinearKernel::new();

        let x = Vector::new(vec![1.0, 2.0, 3.0]);

        // x^T * x = 1^2 + 2^2 + 3^2 = 14
        assert_eq!(kernel.compute(&x, &x), 14.0);
    }

    #[test]
    fn test_linear_kernel_matches_vector_dot() {
        let kernel = LinearKernel::new();
        let x = Vector::new(vec![1.0, 1.5]);
        let y = Vector::new(vec![3.8, 5.2]);

        assert_eq!(kernel.compute(&x, &y), x.dot(&y).unwrap());
        assert_eq!(kernel.compute(&x, &y), kernel.compute(&y, &x));
    }

    #[test]
    fn test_dot_product_dense() {
        assert_eq!(dot_product_dense(&[1.0, 3.0, 2.0], &[2.0, 1.0, 4.0]), 13.0);
        assert_eq!(dot_product_dense(&[], &[]), 0.0);
    }
}
