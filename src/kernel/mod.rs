//! Kernel functions for SVM

pub mod linear;
pub mod rbf;
pub mod traits;

pub use self::linear::*;
pub use self::rbf::*;
pub use self::traits::*;

use crate::core::Vector;
use serde::{Deserialize, Serialize};

/// Kernel selected at configuration time
///
/// The optimizer stores one of these rather than a generic kernel parameter, so
/// the kernel kind can come from a CLI flag or a saved model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelType {
    /// K(x, y) = x^T * y
    Linear,
    /// K(x, y) = exp(-||x - y||² / bandwidth²)
    Gaussian { bandwidth: f64 },
}

impl KernelType {
    /// Short lowercase name, as used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Gaussian { .. } => "gaussian",
        }
    }

    /// Whether the weight vector W is a valid representation of the decision boundary
    pub fn has_explicit_weights(&self) -> bool {
        matches!(self, KernelType::Linear)
    }
}

impl Kernel for KernelType {
    fn compute(&self, x: &Vector, y: &Vector) -> f64 {
        match *self {
            KernelType::Linear => LinearKernel.compute(x, y),
            KernelType::Gaussian { bandwidth } => {
                rbf::gaussian(x.as_slice(), y.as_slice(), bandwidth)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<(Vector, Vector)> {
        vec![
            (Vector::new(vec![1.0, 1.5]), Vector::new(vec![3.8, 5.2])),
            (Vector::new(vec![0.8, 1.2]), Vector::new(vec![1.0, 1.5])),
            (Vector::new(vec![-2.0, 0.0]), Vector::new(vec![0.0, 0.0])),
        ]
    }

    #[test]
    fn test_kernel_type_symmetry() {
        let kernels = [
            KernelType::Linear,
            KernelType::Gaussian { bandwidth: 0.005 },
            KernelType::Gaussian { bandwidth: 2.0 },
        ];
        for kernel in &kernels {
            for (x, y) in pairs() {
                assert_eq!(kernel.compute(&x, &y), kernel.compute(&y, &x));
            }
        }
    }

    #[test]
    fn test_kernel_type_dispatch() {
        let x = Vector::new(vec![1.0, 2.0]);
        let y = Vector::new(vec![2.0, 0.5]);

        assert_eq!(KernelType::Linear.compute(&x, &y), 3.0);
        assert_eq!(
            KernelType::Gaussian { bandwidth: 1.5 }.compute(&x, &y),
            RBFKernel::new(1.5).compute(&x, &y)
        );
    }

    #[test]
    fn test_kernel_type_skips_bandwidth_check() {
        // Bandwidth is validated with the config, not on every evaluation
        let kernel = KernelType::Gaussian { bandwidth: 0.0 };
        let x = Vector::new(vec![1.0, 0.0]);
        let y = Vector::new(vec![0.0, 1.0]);
        assert_eq!(kernel.compute(&x, &y), 0.0);
    }

    #[test]
    fn test_kernel_type_is_reproducible() {
        let kernel = KernelType::Gaussian { bandwidth: 0.9 };
        let x = Vector::new(vec![0.3, -0.7, 1.1]);
        let y = Vector::new(vec![0.2, 0.4, -0.6]);
        let first = kernel.compute(&x, &y);
        for _ in 0..10 {
            assert_eq!(kernel.compute(&x, &y).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_kernel_type_serde() {
        let json = serde_json::to_string(&KernelType::Gaussian { bandwidth: 0.5 }).unwrap();
        assert_eq!(json, r#"{"type":"gaussian","bandwidth":0.5}"#);

        let parsed: KernelType = serde_json::from_str(r#"{"type":"linear"}"#).unwrap();
        assert_eq!(parsed, KernelType::Linear);
        assert!(parsed.has_explicit_weights());
        assert_eq!(KernelType::Gaussian { bandwidth: 1.0 }.name(), "gaussian");
    }
}
