//! Model serialization and persistence
//!
//! This module provides functionality to save and load trained SVM models
//! for use with the CLI application and other scenarios where model persistence is needed.

use crate::api::{TrainedModel, SVM};
use crate::core::{Result, SVMError, Sample, SolverType, Vector};
use crate::kernel::KernelType;
use crate::optimizer::TrainedSVM;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained SVM model
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Support vectors
    pub support_vectors: Vec<SerializableSample>,
    /// Alpha values times labels (alpha_i * y_i)
    pub alpha_y: Vec<f64>,
    /// Bias term, subtracted from the kernel sum
    pub bias: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Positions of the support vectors in the training data
    #[serde(default)]
    pub support_indices: Vec<usize>,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Serializable sample representation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SerializableSample {
    /// Dense feature values
    pub features: Vec<f64>,
    /// Sample label
    pub label: f64,
}

/// Model metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub solver: SolverType,
    pub rounds: usize,
    pub threads: usize,
    pub normalize: bool,
    pub seed: u64,
}

impl From<&SVM> for TrainingParams {
    fn from(svm: &SVM) -> Self {
        Self {
            c: svm.config().c,
            solver: svm.config().solver,
            rounds: svm.rounds(),
            threads: svm.threads(),
            normalize: svm.normalizes(),
            seed: svm.config().seed,
        }
    }
}

impl From<&Sample> for SerializableSample {
    fn from(sample: &Sample) -> Self {
        Self {
            features: sample.features.to_vec(),
            label: sample.label,
        }
    }
}

impl From<&SerializableSample> for Sample {
    fn from(s: &SerializableSample) -> Self {
        Sample::new(Vector::new(s.features.clone()), s.label)
    }
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel, training_params: TrainingParams) -> Self {
        let info = model.info();
        let inner = model.inner();

        let support_vectors: Vec<SerializableSample> = inner
            .support_vectors()
            .iter()
            .map(SerializableSample::from)
            .collect();

        // Calculate alpha_y = alpha_i * y_i for each support vector
        let alpha_y: Vec<f64> = inner
            .alpha_values()
            .iter()
            .zip(inner.support_vectors().iter())
            .map(|(&alpha, sample)| alpha * sample.label)
            .collect();

        Self {
            support_vectors,
            alpha_y,
            bias: info.bias,
            kernel: info.kernel,
            support_indices: info.support_vector_indices,
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: info.n_support_vectors,
                training_params,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SVMError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Convert back to a trained model
    pub fn to_trained_model(&self) -> Result<TrainedModel> {
        if let KernelType::Gaussian { bandwidth } = self.kernel {
            if !(bandwidth > 0.0) {
                return Err(SVMError::SerializationError(format!(
                    "Gaussian bandwidth must be positive, got: {bandwidth}"
                )));
            }
        }
        if self.alpha_y.len() != self.support_vectors.len() {
            return Err(SVMError::SerializationError(format!(
                "{} alpha values for {} support vectors",
                self.alpha_y.len(),
                self.support_vectors.len()
            )));
        }
        if let Some(first) = self.support_vectors.first() {
            let dim = first.features.len();
            if let Some(bad) = self.support_vectors.iter().find(|sv| sv.features.len() != dim) {
                return Err(SVMError::DimensionMismatch {
                    expected: dim,
                    actual: bad.features.len(),
                });
            }
        }

        let support_vectors: Vec<Sample> = self.support_vectors.iter().map(Sample::from).collect();

        // Labels are ±1, so alpha = alpha_y * y
        let alpha: Vec<f64> = self
            .alpha_y
            .iter()
            .zip(&support_vectors)
            .map(|(&alpha_y, sv)| alpha_y * sv.label)
            .collect();

        let support_indices = if self.support_indices.len() == support_vectors.len() {
            self.support_indices.clone()
        } else {
            (0..support_vectors.len()).collect()
        };

        Ok(TrainedModel::new(TrainedSVM::new(
            self.kernel,
            support_vectors,
            alpha,
            support_indices,
            self.bias,
        )))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        let params = &self.metadata.training_params;
        println!("=== SVM Model Summary ===");
        match self.kernel {
            KernelType::Linear => println!("Kernel Type: linear"),
            KernelType::Gaussian { bandwidth } => {
                println!("Kernel Type: gaussian (bandwidth {bandwidth})")
            }
        }
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!(
            "Dimension: {}",
            self.support_vectors
                .first()
                .map(|sv| sv.features.len())
                .unwrap_or(0)
        );
        println!("Bias: {:.6}", self.bias);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", params.c);
        println!("  Solver: {:?}", params.solver);
        println!("  Rounds: {}", params.rounds);
        println!("  Threads: {}", params.threads);
        println!("  Normalize: {}", params.normalize);
        println!("  Seed: {}", params.seed);
    }
}
