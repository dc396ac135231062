//! Training set storage shared by the solvers

use crate::core::{Result, SVMError, Vector};
use std::sync::atomic::{AtomicU64, Ordering};

/// f64 cell that can be read and written from several threads at once.
///
/// Loads and stores are relaxed: a reader sees either the value before or after
/// a concurrent write, never a torn value, with no ordering beyond that.
#[derive(Debug, Default)]
pub struct AtomicAlpha(AtomicU64);

impl AtomicAlpha {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Write without atomic overhead when the caller has exclusive access
    pub fn set(&mut self, value: f64) {
        *self.0.get_mut() = value.to_bits();
    }
}

/// One training sample: input vector, ±1 label and its Lagrange multiplier
#[derive(Debug)]
pub struct TrainingSample {
    x: Vector,
    y: f64,
    alpha: AtomicAlpha,
}

impl TrainingSample {
    /// Input vector
    pub fn x(&self) -> &Vector {
        &self.x
    }

    /// Label, +1 or -1
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Current Lagrange multiplier
    pub fn alpha(&self) -> f64 {
        self.alpha.load()
    }

    /// Whether this sample currently influences the decision boundary
    pub fn is_support_vector(&self) -> bool {
        self.alpha() > 0.0
    }
}

/// Append-only arena of training samples.
///
/// Vectors and labels never change after [`TrainingSet::push`]; alphas are the
/// only mutable part and can be updated through `&self`, which lets training
/// workers share the set while each writes a disjoint group of indices.
#[derive(Debug)]
pub struct TrainingSet {
    dimension: usize,
    samples: Vec<TrainingSample>,
}

impl TrainingSet {
    /// Create an empty set accepting vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            samples: Vec::new(),
        }
    }

    /// Append a sample
    pub fn push(&mut self, x: Vector, y: f64, alpha: f64) -> Result<()> {
        if x.rank() != self.dimension {
            return Err(SVMError::DimensionMismatch {
                expected: self.dimension,
                actual: x.rank(),
            });
        }
        if y != 1.0 && y != -1.0 {
            return Err(SVMError::InvalidLabel(y));
        }
        self.samples.push(TrainingSample {
            x,
            y,
            alpha: AtomicAlpha::new(alpha),
        });
        Ok(())
    }

    /// Configured vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at a 0-based position
    ///
    /// # Panics
    /// Panics if i >= len()
    pub fn sample(&self, i: usize) -> &TrainingSample {
        &self.samples[i]
    }

    /// Iterate over samples in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, TrainingSample> {
        self.samples.iter()
    }

    /// Iterate over input vectors in insertion order
    pub fn vectors(&self) -> impl Iterator<Item = &Vector> {
        self.samples.iter().map(|s| &s.x)
    }

    /// Current alpha of sample i
    pub fn alpha(&self, i: usize) -> f64 {
        self.samples[i].alpha.load()
    }

    /// Overwrite the alpha of sample i
    pub fn store_alpha(&self, i: usize, value: f64) {
        self.samples[i].alpha.store(value);
    }

    /// Overwrite the alpha of sample i with exclusive access
    pub fn set_alpha(&mut self, i: usize, value: f64) {
        self.samples[i].alpha.set(value);
    }

    /// Copy of every alpha, in sample order
    pub fn alphas(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.alpha()).collect()
    }

    /// Number of samples with alpha > 0
    pub fn support_vector_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_support_vector()).count()
    }

    /// Index of the first sample with alpha > 0
    pub fn first_support_vector(&self) -> Option<usize> {
        self.samples.iter().position(|s| s.is_support_vector())
    }
}
