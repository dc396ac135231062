//! Core type definitions for SVM

use crate::core::{Result, SVMError};
use crate::kernel::KernelType;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul};

/// Dense real-valued vector of fixed rank.
///
/// Element access is 1-based, so `get(1)` is the first component. The rank is
/// fixed at construction; every operation either preserves it or produces a new
/// vector. Binary operations on vectors of different rank fail with
/// [`SVMError::DimensionMismatch`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    elements: Vec<f64>,
}

impl Vector {
    /// Create the zero vector of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self {
            elements: vec![0.0; dimension],
        }
    }

    /// Create a vector from an ordered list of components
    pub fn new(elements: Vec<f64>) -> Self {
        Self { elements }
    }

    /// Create a vector from any sequence of components
    pub fn from_element_list<I: IntoIterator<Item = f64>>(elements: I) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    /// Number of components
    pub fn rank(&self) -> usize {
        self.elements.len()
    }

    /// Get the component at a 1-based index
    pub fn get(&self, index: usize) -> Result<f64> {
        let slot = self.slot(index)?;
        Ok(self.elements[slot])
    }

    /// Set the component at a 1-based index
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        let slot = self.slot(index)?;
        self.elements[slot] = value;
        Ok(())
    }

    /// Add `value` to the component at a 1-based index
    pub fn add_to(&mut self, index: usize, value: f64) -> Result<()> {
        let slot = self.slot(index)?;
        self.elements[slot] += value;
        Ok(())
    }

    fn slot(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.rank() {
            return Err(SVMError::IndexOutOfRange {
                index,
                rank: self.rank(),
            });
        }
        Ok(index - 1)
    }

    fn check_rank(&self, other: &Vector) -> Result<()> {
        if self.rank() != other.rank() {
            return Err(SVMError::DimensionMismatch {
                expected: self.rank(),
                actual: other.rank(),
            });
        }
        Ok(())
    }

    /// Inner product
    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_rank(other)?;
        Ok(self
            .elements
            .iter()
            .zip(&other.elements)
            .map(|(a, b)| a * b)
            .sum())
    }

    /// Multiply every component by a scalar
    pub fn scale(&self, factor: f64) -> Vector {
        self.map(|v| v * factor)
    }

    /// Divide every component by a scalar
    pub fn divide(&self, divisor: f64) -> Vector {
        self.map(|v| v / divisor)
    }

    /// Componentwise sum
    pub fn add(&self, other: &Vector) -> Result<Vector> {
        self.check_rank(other)?;
        Ok(self.zip_with(other, |a, b| a + b))
    }

    /// Componentwise difference `self - other`
    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        self.check_rank(other)?;
        Ok(self.zip_with(other, |a, b| a - b))
    }

    /// In-place `self += factor * other`
    pub fn add_scaled(&mut self, factor: f64, other: &Vector) -> Result<()> {
        self.check_rank(other)?;
        for (a, b) in self.elements.iter_mut().zip(&other.elements) {
            *a += factor * b;
        }
        Ok(())
    }

    /// Square every component
    pub fn square(&self) -> Vector {
        self.map(|v| v * v)
    }

    /// Raise every component to `exponent`
    pub fn pow(&self, exponent: f64) -> Vector {
        self.map(|v| v.powf(exponent))
    }

    /// Componentwise division that leaves the numerator untouched wherever the
    /// divisor component is exactly zero
    pub fn safe_div(&self, divisor: &Vector) -> Result<Vector> {
        let mut result = self.clone();
        result.resize(divisor)?;
        Ok(result)
    }

    /// In-place form of [`Vector::safe_div`]
    pub fn resize(&mut self, divisor: &Vector) -> Result<()> {
        self.check_rank(divisor)?;
        for (a, &d) in self.elements.iter_mut().zip(&divisor.elements) {
            if d != 0.0 {
                *a /= d;
            }
        }
        Ok(())
    }

    /// Squared Euclidean norm
    pub fn norm_squared(&self) -> f64 {
        self.elements.iter().map(|v| v * v).sum()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Squared Euclidean distance between two vectors
    pub fn squared_distance(x: &Vector, y: &Vector) -> Result<f64> {
        x.check_rank(y)?;
        Ok(x
            .elements
            .iter()
            .zip(&y.elements)
            .map(|(a, b)| (a - b) * (a - b))
            .sum())
    }

    /// Euclidean distance between two vectors
    pub fn distance(x: &Vector, y: &Vector) -> Result<f64> {
        Ok(Self::squared_distance(x, y)?.sqrt())
    }

    /// Cosine similarity.
    ///
    /// Returns 1.0 when either vector has zero norm: degenerate vectors are
    /// treated as identical.
    pub fn cosine(x: &Vector, y: &Vector) -> Result<f64> {
        let numer = x.dot(y)?;
        let denom = x.norm() * y.norm();

        if denom == 0.0 {
            return Ok(1.0);
        }

        Ok(numer / denom)
    }

    /// Append all components of `y` after those of `x`
    pub fn concat(x: &Vector, y: &Vector) -> Vector {
        let mut elements = Vec::with_capacity(x.rank() + y.rank());
        elements.extend_from_slice(&x.elements);
        elements.extend_from_slice(&y.elements);
        Self { elements }
    }

    /// Per component, keep whichever operand has the larger magnitude (ties keep `y`)
    pub fn max_pooling_amplitude(x: &Vector, y: &Vector) -> Result<Vector> {
        x.check_rank(y)?;
        Ok(x.zip_with(y, |a, b| if a.abs() > b.abs() { a } else { b }))
    }

    /// Components as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.elements
    }

    /// Components as an owned list
    pub fn to_vec(&self) -> Vec<f64> {
        self.elements.clone()
    }

    /// Iterate over components in order
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.elements.iter()
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Vector {
        Self {
            elements: self.elements.iter().map(|&v| f(v)).collect(),
        }
    }

    fn zip_with(&self, other: &Vector, f: impl Fn(f64, f64) -> f64) -> Vector {
        Self {
            elements: self
                .elements
                .iter()
                .zip(&other.elements)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl From<Vec<f64>> for Vector {
    fn from(elements: Vec<f64>) -> Self {
        Self::new(elements)
    }
}

impl FromIterator<f64> for Vector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from_element_list(iter)
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        self.scale(rhs)
    }
}

impl Mul<&Vector> for f64 {
    type Output = Vector;

    fn mul(self, rhs: &Vector) -> Vector {
        rhs.scale(self)
    }
}

impl Div<f64> for &Vector {
    type Output = Vector;

    fn div(self, rhs: f64) -> Vector {
        self.divide(rhs)
    }
}

/// Labeled sample as produced by the dataset loaders
#[derive(Clone, Debug)]
pub struct Sample {
    /// Feature vector
    pub features: Vector,
    /// Class label (+1 or -1 for binary classification)
    pub label: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(features: Vector, label: f64) -> Self {
        Self { features, label }
    }
}

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Confusion matrix of a binary classification run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    pub fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Tally one outcome
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    /// Number of tallied outcomes
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
        )
    }
}

fn ratio(numer: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        numer as f64 / denom as f64
    }
}

impl Add for EvaluationMetrics {
    type Output = EvaluationMetrics;

    fn add(mut self, rhs: EvaluationMetrics) -> EvaluationMetrics {
        self += rhs;
        self
    }
}

impl AddAssign for EvaluationMetrics {
    fn add_assign(&mut self, rhs: EvaluationMetrics) {
        self.true_positives += rhs.true_positives;
        self.true_negatives += rhs.true_negatives;
        self.false_positives += rhs.false_positives;
        self.false_negatives += rhs.false_negatives;
    }
}

/// Which optimizer drives `learn_threading`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverType {
    /// Parallel per-sample gradient ascent on the dual
    DualAscent,
    /// Sequential stochastic sub-gradient (Pegasos)
    Pegasos,
}

/// Step-size rule used by the dual ascent solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GradientRule {
    /// AdaDelta running averages of squared gradients and squared steps
    AdaDelta { rho: f64, eps: f64 },
    /// Plain gradient ascent with a fixed learning rate
    Fixed { eta: f64 },
}

impl GradientRule {
    /// AdaDelta with rho = 0.95, eps = 1e-6
    pub fn ada_delta() -> Self {
        GradientRule::AdaDelta {
            rho: 0.95,
            eps: 1e-6,
        }
    }

    /// Fixed learning rate of 0.001
    pub fn fixed() -> Self {
        GradientRule::Fixed { eta: 0.001 }
    }
}

impl Default for GradientRule {
    fn default() -> Self {
        Self::ada_delta()
    }
}

/// What a dual ascent worker sees when it reads another sample's alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadConsistency {
    /// Live value, possibly written earlier in the same round by any worker.
    /// Per-round results depend on scheduling when more than one worker runs.
    #[default]
    Relaxed,
    /// Frozen copy of the alphas taken when the round started
    Snapshot,
}

/// Configuration for optimizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Training algorithm
    pub solver: SolverType,
    /// Step-size rule for the dual ascent solver
    pub gradient_rule: GradientRule,
    /// Cross-partition read discipline for the dual ascent solver
    pub read_consistency: ReadConsistency,
    /// Regularization strength of the Pegasos solver
    pub pegasos_lambda: f64,
    /// Pegasos steps performed by one `learn_threading` call
    pub pegasos_steps: usize,
    /// Initial alphas are drawn uniformly from [0, initial_alpha_scale)
    pub initial_alpha_scale: f64,
    /// Seed of the random generator
    pub seed: u64,
    /// Maximum number of entries in the prediction kernel cache
    pub prediction_cache_capacity: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 256.0,
            kernel: KernelType::Gaussian { bandwidth: 0.005 },
            solver: SolverType::DualAscent,
            gradient_rule: GradientRule::default(),
            read_consistency: ReadConsistency::default(),
            pegasos_lambda: 0.01,
            pegasos_steps: 100,
            initial_alpha_scale: 10.0,
            seed: 1234,
            prediction_cache_capacity: 1_000_000,
        }
    }
}

impl OptimizerConfig {
    /// Reject configurations no solver can run with
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "C must be positive, got: {}",
                self.c
            )));
        }
        if let KernelType::Gaussian { bandwidth } = self.kernel {
            if !(bandwidth > 0.0) {
                return Err(SVMError::InvalidParameter(format!(
                    "Gaussian bandwidth must be positive, got: {bandwidth}"
                )));
            }
        }
        match self.gradient_rule {
            GradientRule::AdaDelta { rho, eps } => {
                if !(0.0..1.0).contains(&rho) || !(eps > 0.0) {
                    return Err(SVMError::InvalidParameter(format!(
                        "AdaDelta needs 0 <= rho < 1 and eps > 0, got rho={rho}, eps={eps}"
                    )));
                }
            }
            GradientRule::Fixed { eta } => {
                if !(eta > 0.0) {
                    return Err(SVMError::InvalidParameter(format!(
                        "Learning rate must be positive, got: {eta}"
                    )));
                }
            }
        }
        if !(self.pegasos_lambda > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "Pegasos lambda must be positive, got: {}",
                self.pegasos_lambda
            )));
        }
        if self.pegasos_steps == 0 {
            return Err(SVMError::InvalidParameter(
                "Pegasos step count must be at least 1".to_string(),
            ));
        }
        if !(self.initial_alpha_scale >= 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "Initial alpha scale must be non-negative, got: {}",
                self.initial_alpha_scale
            )));
        }
        Ok(())
    }
}
