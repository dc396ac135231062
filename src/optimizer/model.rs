//! Frozen classifier extracted from a trained optimizer

use crate::core::{EvaluationMetrics, Prediction, SVMModel, Sample, Vector};
use crate::kernel::{Kernel, KernelType};

/// A trained SVM model that can make predictions
///
/// Holds only the support vectors; unlike the optimizer it never changes, so it
/// can be shared freely between threads or saved with
/// [`SerializableModel`](crate::persistence::SerializableModel).
#[derive(Debug, Clone)]
pub struct TrainedSVM {
    kernel: KernelType,
    support_vectors: Vec<Sample>,
    alpha: Vec<f64>,
    bias: f64,
    support_indices: Vec<usize>,
}

impl TrainedSVM {
    /// Create a new trained SVM model
    pub(crate) fn new(
        kernel: KernelType,
        support_vectors: Vec<Sample>,
        alpha: Vec<f64>,
        support_indices: Vec<usize>,
        bias: f64,
    ) -> Self {
        debug_assert_eq!(support_vectors.len(), alpha.len());
        Self {
            kernel,
            support_vectors,
            alpha,
            bias,
            support_indices,
        }
    }

    /// f(x) = sum_i alpha_i * y_i * K(x_i, x) - b
    ///
    /// `x` must have the dimension of the training vectors.
    pub fn decision_function(&self, x: &Vector) -> f64 {
        let mut result = 0.0;

        for (support_vector, &alpha) in self.support_vectors.iter().zip(&self.alpha) {
            let kernel_value = self.kernel.compute(&support_vector.features, x);
            result += alpha * support_vector.label * kernel_value;
        }

        result - self.bias
    }

    /// Tally predictions against the labels of `samples`
    pub fn evaluate(&self, samples: &[Sample]) -> EvaluationMetrics {
        let mut metrics = EvaluationMetrics::default();
        for sample in samples {
            let prediction = self.predict(sample);
            metrics.record(prediction.label > 0.0, sample.label > 0.0);
        }
        metrics
    }

    /// Kernel the model was trained with
    pub fn kernel(&self) -> KernelType {
        self.kernel
    }

    /// Dimension of the input vectors, 0 without support vectors
    pub fn dim(&self) -> usize {
        self.support_vectors
            .first()
            .map(|sv| sv.features.rank())
            .unwrap_or(0)
    }

    /// Get the support vectors
    pub fn support_vectors(&self) -> &[Sample] {
        &self.support_vectors
    }

    /// Get the alpha values for support vectors
    pub fn alpha_values(&self) -> &[f64] {
        &self.alpha
    }

    /// Get the indices of support vectors in the original training set
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.support_indices
    }
}

impl SVMModel for TrainedSVM {
    fn predict(&self, sample: &Sample) -> Prediction {
        let decision_value = self.decision_function(&sample.features);
        let label = if decision_value > 0.0 { 1.0 } else { -1.0 };
        Prediction::new(label, decision_value)
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}
