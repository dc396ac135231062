//! High-level API for Support Vector Machine operations
//!
//! This module provides a user-friendly interface for common SVM tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dualsvm::api::SVM;
//! use dualsvm::kernel::KernelType;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model on data
//! let svm = SVM::new()
//!     .with_kernel(KernelType::Linear)
//!     .with_c(10.0)
//!     .with_rounds(1000)
//!     .with_normalization(true)
//!     .train_from_file("data.libsvm")?;
//!
//! // Make predictions
//! let predictions = svm.predict_from_file("test.libsvm")?;
//! println!("Accuracy: {:.2}%", svm.evaluate_from_file("test.libsvm")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, EvaluationMetrics, GradientRule, OptimizerConfig, Prediction, ReadConsistency, Result,
    SVMError, SVMModel, Sample, SolverType,
};
use crate::data::{CSVDataset, LibSVMDataset};
use crate::kernel::KernelType;
use crate::optimizer::{SVMOptimizer, TrainedSVM};
use log::info;
use std::path::Path;

/// High-level SVM interface with builder pattern
///
/// Collects an [`OptimizerConfig`] plus the training schedule: how many rounds
/// to run, on how many threads, and whether to normalize alphas before each
/// round.
#[derive(Debug, Clone)]
pub struct SVM {
    config: OptimizerConfig,
    rounds: usize,
    threads: usize,
    normalize: bool,
}

impl SVM {
    /// Create a new SVM with default parameters
    pub fn new() -> Self {
        Self {
            config: OptimizerConfig::default(),
            rounds: 1000,
            threads: 1,
            normalize: false,
        }
    }

    /// Start from an existing configuration
    pub fn with_config(config: OptimizerConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the kernel
    pub fn with_kernel(mut self, kernel: KernelType) -> Self {
        self.config.kernel = kernel;
        self
    }

    /// Set the training algorithm
    pub fn with_solver(mut self, solver: SolverType) -> Self {
        self.config.solver = solver;
        self
    }

    /// Set the step-size rule of the dual ascent solver
    pub fn with_gradient_rule(mut self, rule: GradientRule) -> Self {
        self.config.gradient_rule = rule;
        self
    }

    /// Set how dual ascent workers read each other's alphas
    pub fn with_read_consistency(mut self, consistency: ReadConsistency) -> Self {
        self.config.read_consistency = consistency;
        self
    }

    /// Set the Pegasos regularization strength
    pub fn with_pegasos_lambda(mut self, lambda: f64) -> Self {
        self.config.pegasos_lambda = lambda;
        self
    }

    /// Set the number of Pegasos steps per round
    pub fn with_pegasos_steps(mut self, steps: usize) -> Self {
        self.config.pegasos_steps = steps;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the upper end of the initial alpha range
    pub fn with_initial_alpha_scale(mut self, scale: f64) -> Self {
        self.config.initial_alpha_scale = scale;
        self
    }

    /// Set prediction cache size in entries
    pub fn with_prediction_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.prediction_cache_capacity = capacity;
        self
    }

    /// Set the number of training rounds
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the number of worker threads per round
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Normalize alphas before every round
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Get the optimizer configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Number of training rounds
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Worker threads per round
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Whether alphas are normalized before every round
    pub fn normalizes(&self) -> bool {
        self.normalize
    }

    /// Build an untrained optimizer for vectors of the given dimension
    pub fn build(&self, dimension: usize) -> Result<SVMOptimizer> {
        SVMOptimizer::new(dimension, self.config.clone())
    }

    /// Add `samples` to a fresh optimizer and run the configured rounds
    ///
    /// Returns the live optimizer, which still supports the prediction cache and
    /// threaded `predict_test`.
    pub fn fit(&self, samples: &[Sample]) -> Result<SVMOptimizer> {
        let first = samples.first().ok_or(SVMError::EmptyDataset)?;
        if self.threads == 0 {
            return Err(SVMError::InvalidParameter(
                "Thread count must be at least 1".to_string(),
            ));
        }

        let mut optimizer = self.build(first.features.rank())?;
        optimizer.add_samples(samples)?;

        info!(
            "Training {} samples: {} rounds of {} on {} threads",
            samples.len(),
            self.rounds,
            self.config.kernel.name(),
            self.threads
        );
        for _ in 0..self.rounds {
            if self.normalize {
                optimizer.normalize_alpha();
            }
            optimizer.learn_threading(self.threads)?;
        }

        if optimizer.support_vector_count() == 0 {
            return Err(SVMError::NotConverged(format!(
                "No support vectors after {} rounds",
                self.rounds
            )));
        }
        info!(
            "Training finished with {} support vectors",
            optimizer.support_vector_count()
        );
        Ok(optimizer)
    }

    /// Train on samples
    pub fn train_samples(self, samples: &[Sample]) -> Result<TrainedModel> {
        let optimizer = self.fit(samples)?;
        Ok(TrainedModel {
            model: optimizer.snapshot()?,
        })
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel> {
        self.train_samples(&dataset.samples())
    }

    /// Train from LibSVM format file
    pub fn train_from_file<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel> {
        let dataset = LibSVMDataset::from_file(path)?;
        self.train(&dataset)
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel> {
        let dataset = CSVDataset::from_file(path)?;
        self.train(&dataset)
    }
}

impl Default for SVM {
    fn default() -> Self {
        Self::new()
    }
}

/// Trained SVM model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: TrainedSVM,
}

impl TrainedModel {
    /// Wrap a frozen model
    pub fn new(model: TrainedSVM) -> Self {
        Self { model }
    }

    /// Predict a single sample
    pub fn predict(&self, sample: &Sample) -> Prediction {
        self.model.predict(sample)
    }

    /// Predict multiple samples
    pub fn predict_batch(&self, samples: &[Sample]) -> Vec<Prediction> {
        self.model.predict_batch(samples)
    }

    /// Predict from dataset
    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Result<Vec<Prediction>> {
        self.check_dimension(dataset)?;
        Ok(self.predict_batch(&dataset.samples()))
    }

    /// Predict from LibSVM file
    pub fn predict_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = LibSVMDataset::from_file_with_dim(path, self.model.dim())?;
        self.predict_dataset(&dataset)
    }

    /// Predict from CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = CSVDataset::from_file(path)?;
        self.predict_dataset(&dataset)
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        Ok(self.evaluate_detailed(dataset)?.accuracy())
    }

    /// Evaluate accuracy from LibSVM file
    pub fn evaluate_from_file<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = LibSVMDataset::from_file_with_dim(path, self.model.dim())?;
        self.evaluate(&dataset)
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file(path)?;
        self.evaluate(&dataset)
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed<D: Dataset>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        self.check_dimension(dataset)?;
        Ok(self.model.evaluate(&dataset.samples()))
    }

    fn check_dimension<D: Dataset>(&self, dataset: &D) -> Result<()> {
        if dataset.dim() != self.model.dim() {
            return Err(SVMError::DimensionMismatch {
                expected: self.model.dim(),
                actual: dataset.dim(),
            });
        }
        Ok(())
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            n_support_vectors: self.model.n_support_vectors(),
            bias: self.model.bias(),
            kernel: self.model.kernel(),
            support_vector_indices: self.model.support_vector_indices().to_vec(),
        }
    }

    /// Get the underlying trained model
    pub fn inner(&self) -> &TrainedSVM {
        &self.model
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub n_support_vectors: usize,
    pub bias: f64,
    pub kernel: KernelType,
    pub support_vector_indices: Vec<usize>,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a linear SVM on LibSVM data, normalizing alphas every round
    pub fn train_libsvm<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
        linear().train_from_file(path)
    }

    /// Train a linear SVM on CSV data, normalizing alphas every round
    pub fn train_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
        linear().train_from_csv(path)
    }

    /// Train with custom C parameter
    pub fn train_libsvm_with_c<P: AsRef<Path>>(path: P, c: f64) -> Result<TrainedModel> {
        linear().with_c(c).train_from_file(path)
    }

    fn linear() -> SVM {
        SVM::new()
            .with_kernel(KernelType::Linear)
            .with_c(10.0)
            .with_normalization(true)
    }

    /// Train on one LibSVM file and run the threaded confusion matrix on another
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        svm: &SVM,
        train_path: P1,
        test_path: P2,
        threads: usize,
    ) -> Result<EvaluationMetrics> {
        let train = LibSVMDataset::from_file(train_path)?;
        let optimizer = svm.fit(&train.samples())?;

        let test = LibSVMDataset::from_file_with_dim(test_path, optimizer.dim())?;
        let samples = test.samples();
        let queries: Vec<_> = samples.iter().map(|s| s.features.clone()).collect();
        let truth: Vec<bool> = samples.iter().map(|s| s.label > 0.0).collect();

        optimizer.predict_test(&queries, &truth, threads)
    }

    /// Hold-out validation helper (sequential split)
    pub fn simple_validation<D: Dataset>(svm: SVM, dataset: &D, train_ratio: f64) -> Result<f64> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let n = dataset.len();
        let train_size = (n as f64 * train_ratio) as usize;

        // Simple sequential split (not randomized for reproducibility)
        let train_samples: Vec<Sample> = (0..train_size).map(|i| dataset.get_sample(i)).collect();
        let test_samples: Vec<Sample> = (train_size..n).map(|i| dataset.get_sample(i)).collect();

        let model = svm.train_samples(&train_samples)?;

        Ok(model.inner().evaluate(&test_samples).accuracy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vector;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn line_samples() -> Vec<Sample> {
        [2.0, -2.0, 1.5, -1.5]
            .iter()
            .map(|&x| Sample::new(Vector::new(vec![x]), if x > 0.0 { 1.0 } else { -1.0 }))
            .collect()
    }

    fn linear_svm() -> SVM {
        SVM::new()
            .with_kernel(KernelType::Linear)
            .with_c(10.0)
            .with_normalization(true)
    }

    #[test]
    fn test_svm_builder_pattern() {
        let svm = SVM::new()
            .with_c(2.0)
            .with_kernel(KernelType::Gaussian { bandwidth: 0.5 })
            .with_solver(SolverType::Pegasos)
            .with_pegasos_lambda(0.1)
            .with_pegasos_steps(50)
            .with_read_consistency(ReadConsistency::Snapshot)
            .with_gradient_rule(GradientRule::fixed())
            .with_seed(7)
            .with_rounds(10)
            .with_threads(3);

        assert_eq!(svm.config.c, 2.0);
        assert_eq!(svm.config.kernel, KernelType::Gaussian { bandwidth: 0.5 });
        assert_eq!(svm.config.solver, SolverType::Pegasos);
        assert_eq!(svm.config.pegasos_lambda, 0.1);
        assert_eq!(svm.config.pegasos_steps, 50);
        assert_eq!(svm.config.read_consistency, ReadConsistency::Snapshot);
        assert_eq!(svm.config.gradient_rule, GradientRule::Fixed { eta: 0.001 });
        assert_eq!(svm.config.seed, 7);
        assert_eq!(svm.rounds, 10);
        assert_eq!(svm.threads, 3);
    }

    #[test]
    fn test_quick_training() {
        let model = linear_svm()
            .train_samples(&line_samples())
            .expect("Training should succeed");

        let prediction = model.predict(&Sample::new(Vector::new(vec![1.0]), 1.0));
        assert_eq!(prediction.label, 1.0);
        let prediction = model.predict(&Sample::new(Vector::new(vec![-1.0]), -1.0));
        assert_eq!(prediction.label, -1.0);

        let info = model.info();
        assert!(info.n_support_vectors > 0);
        assert_eq!(info.kernel, KernelType::Linear);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(matches!(
            linear_svm().fit(&[]),
            Err(SVMError::EmptyDataset)
        ));
        assert!(matches!(
            linear_svm().with_threads(0).fit(&line_samples()),
            Err(SVMError::InvalidParameter(_))
        ));
        assert!(linear_svm().with_c(-1.0).fit(&line_samples()).is_err());
    }

    #[test]
    fn test_fit_keeps_live_optimizer() {
        let optimizer = linear_svm().with_rounds(10).fit(&line_samples()).unwrap();
        assert_eq!(optimizer.rounds(), 10);
        assert_eq!(optimizer.len(), 4);
    }

    #[test]
    fn test_file_operations() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "+1 1:2.0").expect("Failed to write");
        writeln!(temp_file, "-1 1:-2.0").expect("Failed to write");
        writeln!(temp_file, "+1 1:1.5").expect("Failed to write");
        writeln!(temp_file, "-1 1:-1.5").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let model = linear_svm()
            .train_from_file(temp_file.path())
            .expect("Training should succeed");

        let accuracy = model
            .evaluate_from_file(temp_file.path())
            .expect("Evaluation should succeed");
        assert_eq!(accuracy, 1.0);

        let model2 = quick::train_libsvm(temp_file.path()).expect("Quick training should succeed");
        assert!(model2.info().n_support_vectors > 0);

        let metrics = quick::evaluate_split(&linear_svm(), temp_file.path(), temp_file.path(), 2)
            .expect("Split evaluation should succeed");
        assert_eq!(metrics.total(), 4);
    }

    #[test]
    fn test_dimension_checked_on_prediction() {
        let model = linear_svm().train_samples(&line_samples()).unwrap();

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "1.0,2.0,1").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        assert!(matches!(
            model.predict_from_csv(temp_file.path()),
            Err(SVMError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_simple_validation() {
        struct MockDataset {
            samples: Vec<Sample>,
        }

        impl Dataset for MockDataset {
            fn len(&self) -> usize {
                self.samples.len()
            }
            fn dim(&self) -> usize {
                1
            }
            fn get_sample(&self, i: usize) -> Sample {
                self.samples[i].clone()
            }
            fn get_labels(&self) -> Vec<f64> {
                self.samples.iter().map(|s| s.label).collect()
            }
        }

        let samples = [2.0, -2.0, 1.5, -1.5, 1.8, -1.8]
            .iter()
            .map(|&x| Sample::new(Vector::new(vec![x]), if x > 0.0 { 1.0 } else { -1.0 }))
            .collect();

        let dataset = MockDataset { samples };
        let accuracy = quick::simple_validation(linear_svm().with_c(1.0), &dataset, 0.7)
            .expect("Validation should succeed");
        assert!((0.0..=1.0).contains(&accuracy));

        assert!(quick::simple_validation(linear_svm(), &dataset, 1.5).is_err());
    }
}
