//! Parallel gradient ascent on the SVM dual

use crate::core::{GradientRule, ReadConsistency, Result, SVMError};
use crate::solver::{RoundContext, TrainingStrategy};
use log::debug;
use rand::Rng;
use std::thread;

/// Running averages kept by AdaDelta for one multiplier
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdaDeltaState {
    /// Average of squared gradients
    pub v: f64,
    /// Average of squared steps
    pub u: f64,
}

impl AdaDeltaState {
    /// Fold a gradient into the averages and return the step to apply
    pub fn step(&mut self, grad: f64, rho: f64, eps: f64) -> f64 {
        self.v = rho * self.v + (1.0 - rho) * grad * grad;
        let step = (self.u + eps).sqrt() / (self.v + eps).sqrt() * grad;
        self.u = rho * self.u + (1.0 - rho) * step * step;
        step
    }
}

impl GradientRule {
    /// Step for a gradient under this rule, updating the adaptive state if used
    pub fn step(&self, state: &mut AdaDeltaState, grad: f64) -> f64 {
        match *self {
            GradientRule::AdaDelta { rho, eps } => state.step(grad, rho, eps),
            GradientRule::Fixed { eta } => eta * grad,
        }
    }
}

/// Partial derivative of the dual objective with respect to alpha_k:
/// 1 - sum_j alpha_j y_k y_j K(x_k, x_j)
pub fn dual_gradient(k: usize, ctx: &RoundContext<'_>, alpha_of: impl Fn(usize) -> f64) -> f64 {
    let yk = ctx.set.sample(k).y();
    let mut grad = 0.0;
    for (j, (&kkj, sample)) in ctx.kernel_cache.row(k).iter().zip(ctx.set.iter()).enumerate() {
        grad += -alpha_of(j) * yk * sample.y() * kkj;
    }
    grad + 1.0
}

/// Dual ascent solver: each round every multiplier takes one gradient step.
///
/// Samples are split into `thread_count` groups by `k mod thread_count`. A worker
/// writes only the alphas and adaptive states of its own group but reads every
/// alpha while computing gradients; see [`ReadConsistency`] for what it sees.
#[derive(Debug, Clone)]
pub struct DualAscentSolver {
    rule: GradientRule,
    consistency: ReadConsistency,
    states: Vec<AdaDeltaState>,
}

impl DualAscentSolver {
    pub fn new(rule: GradientRule, consistency: ReadConsistency) -> Self {
        Self {
            rule,
            consistency,
            states: Vec::new(),
        }
    }

    /// Adaptive state of every sample seen so far
    pub fn states(&self) -> &[AdaDeltaState] {
        &self.states
    }

    fn sweep(
        rule: GradientRule,
        ctx: RoundContext<'_>,
        frozen: Option<&[f64]>,
        partition: Vec<(usize, &mut AdaDeltaState)>,
    ) {
        for (k, state) in partition {
            let grad = match frozen {
                Some(alphas) => dual_gradient(k, &ctx, |j| alphas[j]),
                None => dual_gradient(k, &ctx, |j| ctx.set.alpha(j)),
            };
            let step = rule.step(state, grad);
            let alpha = (ctx.set.alpha(k) + step).clamp(0.0, ctx.c);
            ctx.set.store_alpha(k, alpha);
        }
    }
}

impl TrainingStrategy for DualAscentSolver {
    fn name(&self) -> &'static str {
        "dual-ascent"
    }

    fn requires_sequential_execution(&self) -> bool {
        false
    }

    fn train_round<R: Rng + ?Sized>(
        &mut self,
        ctx: RoundContext<'_>,
        thread_count: usize,
        _rng: &mut R,
    ) -> Result<()> {
        let n = ctx.set.len();
        if n == 0 {
            return Err(SVMError::EmptyDataset);
        }
        if thread_count == 0 {
            return Err(SVMError::InvalidParameter(
                "Thread count must be at least 1".to_string(),
            ));
        }
        if ctx.kernel_cache.len() != n {
            return Err(SVMError::InvalidDataset(format!(
                "Kernel cache covers {} samples, training set has {}",
                ctx.kernel_cache.len(),
                n
            )));
        }

        self.states.resize(n, AdaDeltaState::default());

        let frozen = match self.consistency {
            ReadConsistency::Snapshot => Some(ctx.set.alphas()),
            ReadConsistency::Relaxed => None,
        };

        let mut partitions: Vec<Vec<(usize, &mut AdaDeltaState)>> =
            (0..thread_count).map(|_| Vec::new()).collect();
        for (k, state) in self.states.iter_mut().enumerate() {
            partitions[k % thread_count].push((k, state));
        }

        let rule = self.rule;
        let frozen = frozen.as_deref();
        thread::scope(|s| {
            for partition in partitions {
                s.spawn(move || Self::sweep(rule, ctx, frozen, partition));
            }
        });

        debug!(
            "{} round over {} samples on {} threads ({:?} reads)",
            self.name(),
            n,
            thread_count,
            self.consistency
        );
        Ok(())
    }
}
