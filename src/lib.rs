//! Kernel Support Vector Machine trained by parallel dual ascent
//!
//! Alphas are updated per sample with an adaptive (AdaDelta) or fixed step and
//! clipped to the box [0, C]; Pegasos is available as a sequential alternative.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod optimizer;
pub mod persistence;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{ModelInfo, TrainedModel, SVM};
pub use crate::cache::{CacheStats, PredictionKernelCache, QueryId, TrainingKernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{CSVDataset, LibSVMDataset};
pub use crate::kernel::{Kernel, KernelType, LinearKernel, RBFKernel};
pub use crate::optimizer::{SVMOptimizer, TrainedSVM};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
