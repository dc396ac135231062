//! Projection of the alphas onto sum(alpha_i * y_i) = 0

use crate::solver::TrainingSet;
use log::warn;

/// Shift every support vector's alpha so that sum(alpha_i * y_i) over the
/// support vectors moves toward zero.
///
/// With `mean = sum(alpha_i * y_i) / n_support`, each support vector becomes
/// `alpha_i - y_i * mean` clamped to `[0, c]`. Samples with alpha == 0 are
/// untouched. Returns the number of support vectors adjusted; with none the
/// call is a no-op.
pub fn normalize_alpha(set: &mut TrainingSet, c: f64) -> usize {
    let mut sum = 0.0;
    let mut support = 0usize;
    for sample in set.iter().filter(|s| s.is_support_vector()) {
        sum += sample.alpha() * sample.y();
        support += 1;
    }

    if support == 0 {
        warn!("Alpha normalization skipped: no support vectors");
        return 0;
    }

    let mean = sum / support as f64;
    for i in 0..set.len() {
        let sample = set.sample(i);
        if sample.is_support_vector() {
            let alpha = (sample.alpha() - sample.y() * mean).clamp(0.0, c);
            set.set_alpha(i, alpha);
        }
    }
    support
}
