//! SVM solver implementations
//!
//! Two structurally different optimizers update the same alpha storage:
//!
//! - [`DualAscentSolver`]: every sample takes an adaptive gradient step on its own
//!   multiplier; samples are split across worker threads by `k mod threads`.
//! - [`PegasosSolver`]: stochastic sub-gradient steps on single random samples,
//!   inherently sequential.
//!
//! The optimizer holds a [`Solver`], which dispatches to the configured variant.

pub mod ascent;
pub mod normalize;
pub mod pegasos;
pub mod state;

pub use self::ascent::*;
pub use self::normalize::*;
pub use self::pegasos::*;
pub use self::state::*;

use crate::cache::TrainingKernelCache;
use crate::core::{OptimizerConfig, Result, SolverType};
use rand::Rng;

/// Everything a training round reads besides the solver's own state
#[derive(Clone, Copy)]
pub struct RoundContext<'a> {
    /// Samples and their alphas
    pub set: &'a TrainingSet,
    /// K(x_i, x_j) for the whole set, built before the round
    pub kernel_cache: &'a TrainingKernelCache,
    /// Upper bound for alpha
    pub c: f64,
}

/// A training algorithm that advances the alphas of a [`TrainingSet`]
pub trait TrainingStrategy: Send {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Whether `train_round` ignores its thread count and runs on the caller's thread
    fn requires_sequential_execution(&self) -> bool;

    /// Run one round and leave every alpha within [0, C]
    fn train_round<R: Rng + ?Sized>(
        &mut self,
        ctx: RoundContext<'_>,
        thread_count: usize,
        rng: &mut R,
    ) -> Result<()>;
}

/// The configured solver
#[derive(Debug, Clone)]
pub enum Solver {
    DualAscent(DualAscentSolver),
    Pegasos(PegasosSolver),
}

impl Solver {
    /// Build the solver selected by the configuration
    pub fn from_config(config: &OptimizerConfig) -> Self {
        match config.solver {
            SolverType::DualAscent => Solver::DualAscent(DualAscentSolver::new(
                config.gradient_rule,
                config.read_consistency,
            )),
            SolverType::Pegasos => Solver::Pegasos(PegasosSolver::new(
                config.pegasos_lambda,
                config.pegasos_steps,
            )),
        }
    }
}

impl TrainingStrategy for Solver {
    fn name(&self) -> &'static str {
        match self {
            Solver::DualAscent(s) => s.name(),
            Solver::Pegasos(s) => s.name(),
        }
    }

    fn requires_sequential_execution(&self) -> bool {
        match self {
            Solver::DualAscent(s) => s.requires_sequential_execution(),
            Solver::Pegasos(s) => s.requires_sequential_execution(),
        }
    }

    fn train_round<R: Rng + ?Sized>(
        &mut self,
        ctx: RoundContext<'_>,
        thread_count: usize,
        rng: &mut R,
    ) -> Result<()> {
        match self {
            Solver::DualAscent(s) => s.train_round(ctx, thread_count, rng),
            Solver::Pegasos(s) => s.train_round(ctx, thread_count, rng),
        }
    }
}
