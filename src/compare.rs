//! Baseline comparison with Cohen's d
//!
//! The pooled standard deviation mixes the population standard deviations of
//! the summaries with the sample pooling denominator `n_b + n_t - 2`. This is
//! the formula behind the published tables and is kept as is.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::record::{ComparisonResult, ConfigSummary, EffectSize};

/// Pooled standard deviation of two summaries.
///
/// Returns 0.0 when the pooling denominator is not positive (both sides have
/// a single seed) or when the squared deviations overflow.
#[must_use]
pub fn pooled_std(baseline: &ConfigSummary, treatment: &ConfigSummary) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let (n_b, n_t) = (baseline.num_seeds as f64, treatment.num_seeds as f64);
    let denominator = n_b + n_t - 2.0;
    if denominator <= 0.0 {
        return 0.0;
    }
    let numerator = (n_b - 1.0) * baseline.eval_loss_std.powi(2)
        + (n_t - 1.0) * treatment.eval_loss_std.powi(2);
    let pooled = (numerator / denominator).sqrt();
    if pooled.is_finite() {
        pooled
    } else {
        0.0
    }
}

/// Percent reduction of mean evaluation loss relative to the baseline.
///
/// A zero baseline mean, or a ratio that overflows, yields 0.0.
#[must_use]
pub fn improvement_pct(baseline_mean: f64, treatment_mean: f64) -> f64 {
    if baseline_mean == 0.0 {
        return 0.0;
    }
    let pct = 100.0 - treatment_mean / baseline_mean * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Cohen's d of `baseline - treatment`; 0.0 when `pooled_std` is not positive.
///
/// An overflowing quotient saturates at `±f64::MAX`.
#[must_use]
pub fn cohens_d(baseline_mean: f64, treatment_mean: f64, pooled_std: f64) -> f64 {
    if pooled_std > 0.0 {
        ((baseline_mean - treatment_mean) / pooled_std).clamp(-f64::MAX, f64::MAX)
    } else {
        0.0
    }
}

/// Compare one treatment summary against the baseline summary.
#[must_use]
pub fn compare_pair(baseline: &ConfigSummary, treatment: &ConfigSummary) -> ComparisonResult {
    let pooled = pooled_std(baseline, treatment);
    let d = cohens_d(baseline.eval_loss_mean, treatment.eval_loss_mean, pooled);
    ComparisonResult {
        alpha: treatment.alpha,
        baseline_alpha: baseline.alpha,
        baseline_loss: baseline.eval_loss_mean,
        treatment_loss: treatment.eval_loss_mean,
        baseline_std: baseline.eval_loss_std,
        treatment_std: treatment.eval_loss_std,
        pooled_std: pooled,
        improvement_pct: improvement_pct(baseline.eval_loss_mean, treatment.eval_loss_mean),
        cohens_d: d,
        effect_size: EffectSize::from_cohens_d(d),
    }
}

/// Compare every non-baseline summary against the alpha = 0.0 summary.
///
/// Without a baseline summary the result is empty; this is reported but not
/// treated as an error.
#[must_use]
pub fn compare(summaries: &BTreeMap<String, ConfigSummary>) -> BTreeMap<String, ComparisonResult> {
    let Some(baseline) = summaries.values().find(|s| s.is_baseline()) else {
        warn!(
            summaries = summaries.len(),
            "baseline (alpha=0.0) missing, statistical analysis skipped"
        );
        return BTreeMap::new();
    };

    let mut results = BTreeMap::new();
    for (key, treatment) in summaries {
        if treatment.is_baseline() {
            continue;
        }
        let result = compare_pair(baseline, treatment);
        info!(
            alpha = result.alpha,
            improvement_pct = result.improvement_pct,
            cohens_d = result.cohens_d,
            effect_size = %result.effect_size,
            "compared against baseline"
        );
        results.insert(key.clone(), result);
    }
    results
}
