//! Kernelized Pegasos

use crate::core::{Result, SVMError};
use crate::solver::{RoundContext, TrainingStrategy};
use log::debug;
use rand::Rng;

/// Stochastic sub-gradient solver.
///
/// Every step draws one sample i and computes its margin
/// `y_i / (lambda * t) * sum_{j != i} count_j * y_j * K(x_i, x_j)`; a margin
/// below 1 increments `count_i`. After the round each alpha is set to
/// `min(count / (lambda * t), C)`.
///
/// Draws come from `0..n-1`: the last sample added is never selected,
/// though it still contributes to the margin sums.
#[derive(Debug, Clone)]
pub struct PegasosSolver {
    lambda: f64,
    steps_per_round: usize,
    counts: Vec<u64>,
    elapsed_steps: u64,
}

impl PegasosSolver {
    pub fn new(lambda: f64, steps_per_round: usize) -> Self {
        Self {
            lambda,
            steps_per_round,
            counts: Vec::new(),
            elapsed_steps: 0,
        }
    }

    /// Steps taken across all rounds
    pub fn elapsed_steps(&self) -> u64 {
        self.elapsed_steps
    }

    /// Number of margin violations recorded per sample
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    fn margin(&self, i: usize, ctx: &RoundContext<'_>) -> f64 {
        let sum: f64 = self
            .counts
            .iter()
            .zip(ctx.kernel_cache.row(i))
            .zip(ctx.set.iter())
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, ((&count, &kij), sample))| count as f64 * sample.y() * kij)
            .sum();
        let coefficient = 1.0 / (self.lambda * self.elapsed_steps as f64);
        ctx.set.sample(i).y() * coefficient * sum
    }
}

impl TrainingStrategy for PegasosSolver {
    fn name(&self) -> &'static str {
        "pegasos"
    }

    fn requires_sequential_execution(&self) -> bool {
        true
    }

    fn train_round<R: Rng + ?Sized>(
        &mut self,
        ctx: RoundContext<'_>,
        thread_count: usize,
        rng: &mut R,
    ) -> Result<()> {
        let n = ctx.set.len();
        if n < 2 {
            return Err(SVMError::InvalidDataset(format!(
                "Pegasos needs at least 2 samples, got {n}"
            )));
        }
        if ctx.kernel_cache.len() != n {
            return Err(SVMError::InvalidDataset(format!(
                "Kernel cache covers {} samples, training set has {}",
                ctx.kernel_cache.len(),
                n
            )));
        }

        self.counts.resize(n, 0);

        let mut violations = 0usize;
        for _ in 0..self.steps_per_round {
            self.elapsed_steps += 1;
            let i = rng.gen_range(0..n - 1);
            if self.margin(i, &ctx) < 1.0 {
                self.counts[i] += 1;
                violations += 1;
            }
        }

        let scale = self.lambda * self.elapsed_steps as f64;
        for (j, &count) in self.counts.iter().enumerate() {
            ctx.set.store_alpha(j, (count as f64 / scale).min(ctx.c));
        }

        debug!(
            "{} round: {} steps, {} margin violations, t = {} (thread count {} ignored)",
            self.name(),
            self.steps_per_round,
            violations,
            self.elapsed_steps,
            thread_count
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TrainingKernelCache;
    use crate::core::Vector;
    use crate::kernel::LinearKernel;
    use crate::solver::TrainingSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn separable_set() -> TrainingSet {
        let mut set = TrainingSet::new(2);
        let points = [
            ([2.0, 2.0], 1.0),
            ([2.5, 1.5], 1.0),
            ([-2.0, -2.0], -1.0),
            ([-1.5, -2.5], -1.0),
        ];
        for (x, y) in points {
            set.push(Vector::new(x.to_vec()), y, 7.0).unwrap();
        }
        set
    }

    #[test]
    fn test_alphas_follow_counts() {
        let set = separable_set();
        let cache = TrainingKernelCache::build(&LinearKernel, set.vectors());
        let ctx = RoundContext {
            set: &set,
            kernel_cache: &cache,
            c: 1e6,
        };
        let mut solver = PegasosSolver::new(0.1, 50);
        let mut rng = StdRng::seed_from_u64(42);

        solver.train_round(ctx, 4, &mut rng).unwrap();
        solver.train_round(ctx, 4, &mut rng).unwrap();

        assert_eq!(solver.elapsed_steps(), 100);
        let scale = 0.1 * 100.0;
        for (alpha, &count) in set.alphas().iter().zip(solver.counts()) {
            assert_eq!(*alpha, count as f64 / scale);
        }
        // The last sample is never drawn
        assert_eq!(solver.counts()[3], 0);
        assert_eq!(set.alpha(3), 0.0);
    }

    #[test]
    fn test_first_step_always_violates() {
        let set = separable_set();
        let cache = TrainingKernelCache::build(&LinearKernel, set.vectors());
        let ctx = RoundContext {
            set: &set,
            kernel_cache: &cache,
            c: 256.0,
        };
        let mut solver = PegasosSolver::new(0.01, 1);
        let mut rng = StdRng::seed_from_u64(7);

        solver.train_round(ctx, 1, &mut rng).unwrap();

        // All counts start at zero, so the first margin is 0 < 1
        assert_eq!(solver.counts().iter().sum::<u64>(), 1);
    }

    #[test]
    fn test_margin_ignores_own_count() {
        // Orthogonal positives: only a sample's own term could lift its margin
        let mut set = TrainingSet::new(2);
        set.push(Vector::new(vec![1.0, 0.0]), 1.0, 0.0).unwrap();
        set.push(Vector::new(vec![0.0, 1.0]), 1.0, 0.0).unwrap();
        set.push(Vector::new(vec![0.0, 0.0]), -1.0, 0.0).unwrap();
        let cache = TrainingKernelCache::build(&LinearKernel, set.vectors());
        let ctx = RoundContext {
            set: &set,
            kernel_cache: &cache,
            c: 1e6,
        };
        let mut solver = PegasosSolver::new(0.01, 100);
        let mut rng = StdRng::seed_from_u64(11);

        solver.train_round(ctx, 1, &mut rng).unwrap();

        // Every draw is a violation even after its count has grown
        assert_eq!(solver.counts().iter().sum::<u64>(), 100);
        assert!(solver.counts()[0] > 1);
    }

    #[test]
    fn test_alphas_clamped_to_c() {
        let set = separable_set();
        let cache = TrainingKernelCache::build(&LinearKernel, set.vectors());
        let ctx = RoundContext {
            set: &set,
            kernel_cache: &cache,
            c: 0.5,
        };
        let mut solver = PegasosSolver::new(0.001, 200);
        let mut rng = StdRng::seed_from_u64(3);

        solver.train_round(ctx, 1, &mut rng).unwrap();
        for alpha in set.alphas() {
            assert!((0.0..=0.5).contains(&alpha));
        }
    }

    #[test]
    fn test_requires_two_samples() {
        let mut set = TrainingSet::new(1);
        set.push(Vector::new(vec![1.0]), 1.0, 0.0).unwrap();
        let cache = TrainingKernelCache::build(&LinearKernel, set.vectors());
        let ctx = RoundContext {
            set: &set,
            kernel_cache: &cache,
            c: 1.0,
        };
        let mut solver = PegasosSolver::new(0.01, 10);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            solver.train_round(ctx, 1, &mut rng),
            Err(SVMError::InvalidDataset(_))
        ));
    }
}
