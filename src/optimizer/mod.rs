//! Trainable SVM model
//!
//! [`SVMOptimizer`] owns the training set, the kernel caches, the configured
//! solver and the seeded random generator. Training is driven externally: the
//! caller decides how many rounds of [`SVMOptimizer::learn_threading`] to run
//! and whether to [`SVMOptimizer::normalize_alpha`] in between.

pub mod model;

pub use self::model::TrainedSVM;

use crate::cache::{CacheStats, ModelCache, PredictionKernelCache, QueryId, TrainingKernelCache};
use crate::core::{EvaluationMetrics, OptimizerConfig, Result, SVMError, Sample, Vector};
use crate::kernel::{Kernel, KernelType};
use crate::solver::{self, RoundContext, Solver, TrainingSet, TrainingStrategy};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::thread;

/// Kernel SVM trained by repeated solver rounds over a fixed sample set
pub struct SVMOptimizer {
    config: OptimizerConfig,
    set: TrainingSet,
    solver: Solver,
    rng: Box<dyn RngCore + Send + Sync>,
    training_cache: TrainingKernelCache,
    prediction_cache: PredictionKernelCache,
    model: ModelCache,
    rounds: usize,
}

impl SVMOptimizer {
    /// Create an empty model for vectors of the given dimension
    pub fn new(dimension: usize, config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        if dimension == 0 {
            return Err(SVMError::InvalidParameter(
                "Dimension must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            rng: Box::new(StdRng::seed_from_u64(config.seed)),
            solver: Solver::from_config(&config),
            set: TrainingSet::new(dimension),
            training_cache: TrainingKernelCache::default(),
            prediction_cache: PredictionKernelCache::new(config.prediction_cache_capacity),
            model: ModelCache::default(),
            rounds: 0,
            config,
        })
    }

    /// Replace the random generator
    ///
    /// Initial alphas are drawn in [`add_data`](Self::add_data), so call this
    /// before adding samples.
    pub fn with_rng<R: RngCore + Send + Sync + 'static>(mut self, rng: R) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Append a training sample with a random initial alpha
    pub fn add_data(&mut self, x: Vector, y: f64) -> Result<()> {
        self.set.push(x, y, 0.0)?;

        let alpha = (self.rng.gen::<f64>() * self.config.initial_alpha_scale).clamp(0.0, self.config.c);
        let last = self.set.len() - 1;
        self.set.set_alpha(last, alpha);

        self.model.invalidate();
        Ok(())
    }

    /// Append every sample of a slice
    pub fn add_samples(&mut self, samples: &[Sample]) -> Result<()> {
        for sample in samples {
            self.add_data(sample.features.clone(), sample.label)?;
        }
        Ok(())
    }

    /// Run one training round of the configured solver
    ///
    /// The dual ascent solver spreads the round over `thread_count` workers;
    /// Pegasos runs its configured number of steps on the calling thread.
    pub fn learn_threading(&mut self, thread_count: usize) -> Result<()> {
        if thread_count == 0 {
            return Err(SVMError::InvalidParameter(
                "Thread count must be at least 1".to_string(),
            ));
        }
        if self.set.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        self.ensure_training_cache();

        let ctx = RoundContext {
            set: &self.set,
            kernel_cache: &self.training_cache,
            c: self.config.c,
        };
        let result = self.solver.train_round(ctx, thread_count, self.rng.as_mut());
        self.model.invalidate();
        result?;

        self.rounds += 1;
        debug!(
            "Round {} ({}): {} support vectors",
            self.rounds,
            self.solver.name(),
            self.set.support_vector_count()
        );
        Ok(())
    }

    /// Shift alphas toward sum(alpha_i * y_i) = 0; returns the number of support
    /// vectors adjusted
    pub fn normalize_alpha(&mut self) -> usize {
        let adjusted = solver::normalize_alpha(&mut self.set, self.config.c);
        self.model.invalidate();
        adjusted
    }

    fn ensure_training_cache(&mut self) {
        if self.training_cache.len() == self.set.len() {
            return;
        }

        info!("Building training kernel cache for {} samples", self.set.len());
        self.training_cache = TrainingKernelCache::build(&self.config.kernel, self.set.vectors());
        info!(
            "Training kernel cache ready: {} entries",
            self.set.len() * self.set.len()
        );
    }

    fn fresh_training_cache(&self) -> Option<&TrainingKernelCache> {
        (self.training_cache.len() == self.set.len()).then_some(&self.training_cache)
    }

    fn training_kernel(&self, i: usize, j: usize) -> f64 {
        match self.fresh_training_cache().and_then(|cache| cache.get(i, j)) {
            Some(value) => value,
            None => self
                .config
                .kernel
                .compute(self.set.sample(i).x(), self.set.sample(j).x()),
        }
    }

    fn check_dimension(&self, x: &Vector) -> Result<()> {
        if x.rank() != self.set.dimension() {
            return Err(SVMError::DimensionMismatch {
                expected: self.set.dimension(),
                actual: x.rank(),
            });
        }
        Ok(())
    }

    /// Weight vector sum(alpha_i * y_i * x_i)
    ///
    /// Only describes the decision boundary under the linear kernel.
    pub fn w(&self) -> Result<Vector> {
        self.weights().cloned()
    }

    fn weights(&self) -> Result<&Vector> {
        self.model.weights.get_or_try_compute(|| -> Result<Vector> {
            let mut w = Vector::zeros(self.set.dimension());
            for sample in self.set.iter() {
                w.add_scaled(sample.alpha() * sample.y(), sample.x())?;
            }
            Ok(w)
        })
    }

    /// Decision value of training sample k without the bias term
    fn unbiased_decision_at(&self, k: usize) -> Result<f64> {
        let xk = self.set.sample(k).x();
        match self.config.kernel {
            KernelType::Linear => self.weights()?.dot(xk),
            KernelType::Gaussian { .. } => Ok(self
                .set
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_support_vector())
                .map(|(j, s)| s.alpha() * s.y() * self.training_kernel(j, k))
                .sum()),
        }
    }

    /// Bias averaged over every support vector
    ///
    /// Returns 0.0 when there are no support vectors.
    pub fn b(&self) -> Result<f64> {
        self.model
            .bias
            .get_or_try_compute(|| -> Result<f64> {
                let mut sum = 0.0;
                let mut count = 0usize;
                for (k, sample) in self.set.iter().enumerate() {
                    if sample.is_support_vector() {
                        sum += self.unbiased_decision_at(k)? - sample.y();
                        count += 1;
                    }
                }
                if count == 0 {
                    warn!("No support vectors, using bias 0");
                    return Ok(0.0);
                }
                Ok(sum / count as f64)
            })
            .copied()
    }

    /// Bias taken from the first support vector alone
    ///
    /// Used by classification. Returns 0.0 when there are no support vectors.
    pub fn b_quick(&self) -> Result<f64> {
        self.model
            .quick_bias
            .get_or_try_compute(|| -> Result<f64> {
                match self.set.first_support_vector() {
                    Some(k) => Ok(self.unbiased_decision_at(k)? - self.set.sample(k).y()),
                    None => {
                        warn!("No support vectors, using quick bias 0");
                        Ok(0.0)
                    }
                }
            })
            .copied()
    }

    /// Precompute K(x_j, q) for every query and every current sample
    ///
    /// Returns one handle per query, in order, for use with
    /// [`classify_cached`](Self::classify_cached) and
    /// [`predict_test_cached`](Self::predict_test_cached).
    pub fn create_predict_cache(&mut self, queries: &[Vector]) -> Result<Vec<QueryId>> {
        for query in queries {
            self.check_dimension(query)?;
        }

        let mut ids = Vec::with_capacity(queries.len());
        for query in queries {
            let id = self.prediction_cache.register_query();
            for (j, sample) in self.set.iter().enumerate() {
                let value = self.config.kernel.compute(sample.x(), query);
                self.prediction_cache.put(id, j, value);
            }
            ids.push(id);
        }

        info!(
            "Prediction kernel cache: {} queries x {} samples ({} entries held)",
            queries.len(),
            self.set.len(),
            self.prediction_cache.len()
        );
        Ok(ids)
    }

    fn decision_with_bias(&self, bias: f64, query: Option<QueryId>, x: &Vector) -> f64 {
        let mut sum = 0.0;
        for (j, sample) in self.set.iter().enumerate() {
            let alpha = sample.alpha();
            if alpha > 0.0 {
                let kernel_value = query
                    .and_then(|id| self.prediction_cache.get(id, j))
                    .unwrap_or_else(|| self.config.kernel.compute(sample.x(), x));
                sum += alpha * sample.y() * kernel_value;
            }
        }
        sum - bias
    }

    /// f(x) = sum over support vectors of alpha_i * y_i * K(x_i, x), minus the quick bias
    pub fn decision_value(&self, x: &Vector) -> Result<f64> {
        self.check_dimension(x)?;
        Ok(self.decision_with_bias(self.b_quick()?, None, x))
    }

    /// Decision value using kernel values cached under `query`, computing misses directly
    pub fn decision_value_cached(&self, query: QueryId, x: &Vector) -> Result<f64> {
        self.check_dimension(x)?;
        Ok(self.decision_with_bias(self.b_quick()?, Some(query), x))
    }

    /// Whether x falls on the positive side; f(x) == 0 classifies negative
    pub fn classify(&self, x: &Vector) -> Result<bool> {
        Ok(self.decision_value(x)? > 0.0)
    }

    /// Like [`classify`](Self::classify), reading kernel values from the prediction cache
    pub fn classify_cached(&self, query: QueryId, x: &Vector) -> Result<bool> {
        Ok(self.decision_value_cached(query, x)? > 0.0)
    }

    /// Classify `queries` on `thread_count` workers and tally against `ground_truth`
    ///
    /// Query i goes to worker i mod thread_count.
    pub fn predict_test(
        &self,
        queries: &[Vector],
        ground_truth: &[bool],
        thread_count: usize,
    ) -> Result<EvaluationMetrics> {
        self.evaluate_partitioned(None, queries, ground_truth, thread_count)
    }

    /// [`predict_test`](Self::predict_test) with handles from
    /// [`create_predict_cache`](Self::create_predict_cache), one per query
    pub fn predict_test_cached(
        &self,
        ids: &[QueryId],
        queries: &[Vector],
        ground_truth: &[bool],
        thread_count: usize,
    ) -> Result<EvaluationMetrics> {
        if ids.len() != queries.len() {
            return Err(SVMError::InvalidParameter(format!(
                "Got {} query handles for {} queries",
                ids.len(),
                queries.len()
            )));
        }
        self.evaluate_partitioned(Some(ids), queries, ground_truth, thread_count)
    }

    fn evaluate_partitioned(
        &self,
        ids: Option<&[QueryId]>,
        queries: &[Vector],
        ground_truth: &[bool],
        thread_count: usize,
    ) -> Result<EvaluationMetrics> {
        if thread_count == 0 {
            return Err(SVMError::InvalidParameter(
                "Thread count must be at least 1".to_string(),
            ));
        }
        if queries.len() != ground_truth.len() {
            return Err(SVMError::InvalidParameter(format!(
                "Got {} labels for {} queries",
                ground_truth.len(),
                queries.len()
            )));
        }
        for query in queries {
            self.check_dimension(query)?;
        }

        let bias = self.b_quick()?;

        let partials: Vec<EvaluationMetrics> = thread::scope(|s| {
            let handles: Vec<_> = (0..thread_count)
                .map(|t| {
                    s.spawn(move || {
                        let mut metrics = EvaluationMetrics::default();
                        for i in (t..queries.len()).step_by(thread_count) {
                            let id = ids.map(|ids| ids[i]);
                            let value = self.decision_with_bias(bias, id, &queries[i]);
                            metrics.record(value > 0.0, ground_truth[i]);
                        }
                        if metrics.total() > 0
                            && (metrics.true_positives == 0 || metrics.true_negatives == 0)
                        {
                            debug!(
                                "Worker {}: {} queries, tp={} tn={} fp={} fn={}",
                                t,
                                metrics.total(),
                                metrics.true_positives,
                                metrics.true_negatives,
                                metrics.false_positives,
                                metrics.false_negatives
                            );
                        }
                        metrics
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        Ok(partials
            .into_iter()
            .fold(EvaluationMetrics::default(), |acc, m| acc + m))
    }

    /// Number of samples with alpha > 0
    pub fn support_vector_count(&self) -> usize {
        self.set.support_vector_count()
    }

    /// Current alpha of every sample, in insertion order
    pub fn alphas(&self) -> Vec<f64> {
        self.set.alphas()
    }

    /// ||W||², meaningful for the linear kernel only
    pub fn loss(&self) -> Result<f64> {
        Ok(self.weights()?.norm_squared())
    }

    /// Dual objective sum(alpha) - 1/2 sum_ij alpha_i alpha_j y_i y_j K(x_i, x_j)
    pub fn objective(&self) -> f64 {
        let mut linear = 0.0;
        let mut quadratic = 0.0;
        for (i, si) in self.set.iter().enumerate() {
            let ai = si.alpha();
            linear += ai;
            if ai == 0.0 {
                continue;
            }
            for (j, sj) in self.set.iter().enumerate() {
                quadratic += ai * sj.alpha() * si.y() * sj.y() * self.training_kernel(i, j);
            }
        }
        linear - 0.5 * quadratic
    }

    /// Freeze the current support vectors and averaged bias into a standalone model
    pub fn snapshot(&self) -> Result<TrainedSVM> {
        let bias = self.b()?;

        let mut support_vectors = Vec::new();
        let mut alpha = Vec::new();
        let mut indices = Vec::new();
        for (i, sample) in self.set.iter().enumerate() {
            if sample.is_support_vector() {
                support_vectors.push(Sample::new(sample.x().clone(), sample.y()));
                alpha.push(sample.alpha());
                indices.push(i);
            }
        }

        Ok(TrainedSVM::new(
            self.config.kernel,
            support_vectors,
            alpha,
            indices,
            bias,
        ))
    }

    /// Number of training samples
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Whether no samples were added yet
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Dimension of the input vectors
    pub fn dim(&self) -> usize {
        self.set.dimension()
    }

    /// Training rounds completed
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Get the optimizer configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Get the kernel
    pub fn kernel(&self) -> KernelType {
        self.config.kernel
    }

    /// Samples, labels and alphas
    pub fn training_set(&self) -> &TrainingSet {
        &self.set
    }

    /// Hit and miss counts of the prediction cache
    pub fn prediction_cache_stats(&self) -> CacheStats {
        self.prediction_cache.stats()
    }
}

impl std::fmt::Debug for SVMOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SVMOptimizer")
            .field("config", &self.config)
            .field("samples", &self.set.len())
            .field("solver", &self.solver.name())
            .field("rounds", &self.rounds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GradientRule, ReadConsistency, SVMModel, SolverType};
    use approx::assert_relative_eq;

    fn linear_config(c: f64) -> OptimizerConfig {
        OptimizerConfig {
            c,
            kernel: KernelType::Linear,
            ..OptimizerConfig::default()
        }
    }

    /// (2, 1) -> +1 and (-2, -1) -> -1 with both alphas fixed at 0.1
    fn two_point_model() -> SVMOptimizer {
        let mut opt = SVMOptimizer::new(2, linear_config(10.0)).unwrap();
        opt.add_data(Vector::new(vec![2.0, 1.0]), 1.0).unwrap();
        opt.add_data(Vector::new(vec![-2.0, -1.0]), -1.0).unwrap();
        opt.set.set_alpha(0, 0.1);
        opt.set.set_alpha(1, 0.1);
        opt.model.invalidate();
        opt
    }

    #[test]
    fn test_new_validates() {
        assert!(SVMOptimizer::new(0, OptimizerConfig::default()).is_err());
        assert!(SVMOptimizer::new(2, linear_config(-1.0)).is_err());
        assert!(SVMOptimizer::new(2, linear_config(1.0)).is_ok());
    }

    #[test]
    fn test_add_data_checks_input() {
        let mut opt = SVMOptimizer::new(2, linear_config(1.0)).unwrap();
        assert!(matches!(
            opt.add_data(Vector::new(vec![1.0, 2.0, 3.0]), 1.0),
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(matches!(
            opt.add_data(Vector::new(vec![1.0, 2.0]), 2.0),
            Err(SVMError::InvalidLabel(_))
        ));
        assert!(opt.is_empty());
    }

    #[test]
    fn test_initial_alphas_are_bounded() {
        let mut opt = SVMOptimizer::new(1, linear_config(3.0)).unwrap();
        for i in 0..50 {
            let y = if i % 2 == 0 { 1.0 } else { -1.0 };
            opt.add_data(Vector::new(vec![i as f64]), y).unwrap();
        }
        assert!(opt.alphas().iter().all(|&a| (0.0..=3.0).contains(&a)));
        // With scale 10 and C = 3 some draws must have been clamped
        assert!(opt.alphas().iter().any(|&a| a == 3.0));
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let build = |seed: u64| {
            let config = OptimizerConfig {
                seed,
                ..linear_config(256.0)
            };
            let mut opt = SVMOptimizer::new(1, config).unwrap();
            opt.add_data(Vector::new(vec![1.0]), 1.0).unwrap();
            opt.add_data(Vector::new(vec![2.0]), -1.0).unwrap();
            opt.alphas()
        };
        assert_eq!(build(1234), build(1234));
        assert_ne!(build(1234), build(99));
    }

    #[test]
    fn test_with_rng_replaces_generator() {
        let config = linear_config(256.0);
        let mut a = SVMOptimizer::new(1, config.clone())
            .unwrap()
            .with_rng(StdRng::seed_from_u64(5));
        let mut b = SVMOptimizer::new(1, OptimizerConfig { seed: 5, ..config }).unwrap();
        a.add_data(Vector::new(vec![1.0]), 1.0).unwrap();
        b.add_data(Vector::new(vec![1.0]), 1.0).unwrap();
        assert_eq!(a.alphas(), b.alphas());
    }

    #[test]
    fn test_weight_vector_and_bias() {
        let opt = two_point_model();

        let w = opt.w().unwrap();
        assert_relative_eq!(w.get(1).unwrap(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(w.get(2).unwrap(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(opt.loss().unwrap(), 0.2, epsilon = 1e-12);

        // Both points sit exactly on the margin
        assert_relative_eq!(opt.b().unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(opt.b_quick().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_classify() {
        let opt = two_point_model();

        assert_relative_eq!(
            opt.decision_value(&Vector::new(vec![1.0, 0.5])).unwrap(),
            0.5,
            epsilon = 1e-12
        );
        assert!(opt.classify(&Vector::new(vec![1.0, 0.5])).unwrap());
        assert!(!opt.classify(&Vector::new(vec![-1.0, -0.5])).unwrap());
        assert!(matches!(
            opt.classify(&Vector::new(vec![1.0])),
            Err(SVMError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_cached_classification_matches_direct() {
        let mut opt = two_point_model();
        let queries = vec![
            Vector::new(vec![1.0, 0.5]),
            Vector::new(vec![-3.0, 0.2]),
            Vector::new(vec![0.1, 0.1]),
        ];
        let ids = opt.create_predict_cache(&queries).unwrap();
        assert_eq!(ids.len(), 3);

        for (id, query) in ids.iter().zip(&queries) {
            assert_eq!(
                opt.decision_value_cached(*id, query).unwrap(),
                opt.decision_value(query).unwrap()
            );
        }
        assert!(opt.prediction_cache_stats().hits >= 6);
    }

    #[test]
    fn test_predict_test_totals() {
        let opt = two_point_model();
        let queries: Vec<Vector> = (0..11)
            .map(|i| Vector::new(vec![i as f64 - 5.0, 0.3]))
            .collect();
        let truth: Vec<bool> = (0..11).map(|i| i % 3 == 0).collect();

        let sequential = opt.predict_test(&queries, &truth, 1).unwrap();
        assert_eq!(sequential.total(), 11);
        for threads in [2, 3, 4, 16] {
            assert_eq!(opt.predict_test(&queries, &truth, threads).unwrap(), sequential);
        }
    }

    #[test]
    fn test_predict_test_rejects_bad_input() {
        let opt = two_point_model();
        let queries = vec![Vector::new(vec![1.0, 1.0])];
        assert!(opt.predict_test(&queries, &[true], 0).is_err());
        assert!(opt.predict_test(&queries, &[true, false], 1).is_err());
        assert_eq!(opt.predict_test(&[], &[], 4).unwrap().total(), 0);
    }

    #[test]
    fn test_round_invalidates_model_cache() {
        let mut opt = SVMOptimizer::new(2, linear_config(10.0)).unwrap();
        opt.add_data(Vector::new(vec![2.0, 1.0]), 1.0).unwrap();
        opt.add_data(Vector::new(vec![-2.0, -1.0]), -1.0).unwrap();

        opt.w().unwrap();
        opt.b().unwrap();
        assert!(!opt.model.is_stale());

        opt.learn_threading(1).unwrap();
        assert!(opt.model.is_stale());
        assert_eq!(opt.rounds(), 1);

        opt.b_quick().unwrap();
        opt.normalize_alpha();
        assert!(opt.model.is_stale());
    }

    #[test]
    fn test_learn_threading_rejects_bad_input() {
        let mut opt = SVMOptimizer::new(2, linear_config(10.0)).unwrap();
        assert!(matches!(opt.learn_threading(1), Err(SVMError::EmptyDataset)));
        opt.add_data(Vector::new(vec![2.0, 1.0]), 1.0).unwrap();
        assert!(matches!(
            opt.learn_threading(0),
            Err(SVMError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_training_cache_rebuilt_after_add() {
        let mut opt = SVMOptimizer::new(1, linear_config(10.0)).unwrap();
        opt.add_data(Vector::new(vec![1.0]), 1.0).unwrap();
        opt.add_data(Vector::new(vec![-1.0]), -1.0).unwrap();
        opt.learn_threading(2).unwrap();
        assert_eq!(opt.training_cache.len(), 2);

        opt.add_data(Vector::new(vec![2.0]), 1.0).unwrap();
        opt.learn_threading(2).unwrap();
        assert_eq!(opt.training_cache.len(), 3);
    }

    #[test]
    fn test_zero_support_vectors() {
        let mut opt = two_point_model();
        opt.set.set_alpha(0, 0.0);
        opt.set.set_alpha(1, 0.0);
        opt.model.invalidate();

        assert_eq!(opt.support_vector_count(), 0);
        assert_eq!(opt.b().unwrap(), 0.0);
        assert_eq!(opt.b_quick().unwrap(), 0.0);
        assert_eq!(opt.normalize_alpha(), 0);
        assert!(!opt.classify(&Vector::new(vec![1.0, 1.0])).unwrap());
    }

    #[test]
    fn test_normalize_keeps_alphas_below_c() {
        let mut opt = SVMOptimizer::new(1, linear_config(1.0)).unwrap();
        opt.add_data(Vector::new(vec![1.0]), 1.0).unwrap();
        opt.add_data(Vector::new(vec![2.0]), 1.0).unwrap();
        opt.add_data(Vector::new(vec![-1.0]), -1.0).unwrap();
        for i in 0..3 {
            opt.set.set_alpha(i, 1.0);
        }

        assert_eq!(opt.normalize_alpha(), 3);
        let alphas = opt.alphas();
        assert!(alphas.iter().all(|&a| (0.0..=1.0).contains(&a)), "{alphas:?}");
        assert_eq!(alphas[2], 1.0);
    }

    #[test]
    fn test_objective_of_fixed_alphas() {
        let opt = two_point_model();
        // sum(alpha) = 0.2, quadratic term = ||W||² = 0.2
        assert_relative_eq!(opt.objective(), 0.2 - 0.5 * 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_snapshot_matches_optimizer() {
        let opt = two_point_model();
        let model = opt.snapshot().unwrap();

        assert_eq!(model.support_vector_indices(), &[0, 1]);
        assert_eq!(model.bias(), opt.b().unwrap());
        let x = Vector::new(vec![0.7, -0.2]);
        assert_relative_eq!(
            model.decision_function(&x),
            opt.decision_value(&x).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pegasos_round_dispatch() {
        let config = OptimizerConfig {
            solver: SolverType::Pegasos,
            pegasos_steps: 25,
            ..linear_config(100.0)
        };
        let mut opt = SVMOptimizer::new(2, config).unwrap();
        opt.add_data(Vector::new(vec![2.0, 2.0]), 1.0).unwrap();
        opt.add_data(Vector::new(vec![-2.0, -2.0]), -1.0).unwrap();
        opt.add_data(Vector::new(vec![1.0, 2.0]), 1.0).unwrap();

        opt.learn_threading(8).unwrap();
        assert!(opt.support_vector_count() >= 1);
        assert!(opt.alphas().iter().all(|&a| (0.0..=100.0).contains(&a)));
    }

    #[test]
    fn test_fixed_rate_snapshot_reads_are_thread_independent() {
        let run = |threads: usize| {
            let config = OptimizerConfig {
                gradient_rule: GradientRule::fixed(),
                read_consistency: ReadConsistency::Snapshot,
                ..linear_config(256.0)
            };
            let mut opt = SVMOptimizer::new(2, config).unwrap();
            opt.add_data(Vector::new(vec![1.0, 1.5]), 1.0).unwrap();
            opt.add_data(Vector::new(vec![3.8, 5.2]), -1.0).unwrap();
            opt.add_data(Vector::new(vec![0.8, 1.2]), 1.0).unwrap();
            for _ in 0..20 {
                opt.learn_threading(threads).unwrap();
            }
            opt.alphas()
        };
        assert_eq!(run(1), run(3));
    }
}
