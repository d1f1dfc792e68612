//! Cross-seed aggregation
//!
//! Summaries use the population convention (divisor `n`) for standard
//! deviation. Samples are sorted before summation, which makes the result
//! bit-identical for any arrival order of the same runs.

use tracing::{debug, warn};

use crate::plan::ExperimentConfiguration;
use crate::record::{ConfigSummary, RunResult};

/// Mean and population standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanStd {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl MeanStd {
    /// Whether both statistics are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.std.is_finite()
    }
}

/// Order-independent mean and population standard deviation.
///
/// Returns `None` for an empty sample.
#[must_use]
pub fn mean_std(values: &[f64]) -> Option<MeanStd> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    #[allow(clippy::cast_precision_loss)]
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;

    let mut deviations: Vec<f64> = sorted.iter().map(|x| (x - mean).powi(2)).collect();
    deviations.sort_by(f64::total_cmp);
    let variance = deviations.iter().sum::<f64>() / n;

    Some(MeanStd {
        mean,
        std: variance.sqrt(),
    })
}

/// Summarize the runs of one configuration.
///
/// Only successful runs count. Returns `None` when there are none, or when
/// the losses are so large that the mean or deviation overflows, in which
/// case the configuration is left out of the aggregate output.
#[must_use]
pub fn aggregate(
    configuration: &ExperimentConfiguration,
    runs: &[RunResult],
) -> Option<ConfigSummary> {
    let successes: Vec<RunResult> = runs
        .iter()
        .filter(|run| run.is_success())
        .cloned()
        .collect();

    let eval: Vec<f64> = successes
        .iter()
        .filter_map(RunResult::final_eval_loss)
        .collect();
    let train: Vec<f64> = successes
        .iter()
        .filter_map(RunResult::final_train_loss)
        .collect();

    let (Some(eval_stats), Some(train_stats)) = (mean_std(&eval), mean_std(&train)) else {
        warn!(
            alpha = configuration.alpha,
            attempted = runs.len(),
            "no successful seeds, configuration skipped from aggregation"
        );
        return None;
    };

    // JSON has no encoding for inf, a persisted summary must stay loadable
    if !(eval_stats.is_finite() && train_stats.is_finite()) {
        warn!(
            alpha = configuration.alpha,
            eval_loss_mean = eval_stats.mean,
            eval_loss_std = eval_stats.std,
            "statistics overflowed, configuration skipped from aggregation"
        );
        return None;
    }

    debug!(
        alpha = configuration.alpha,
        num_seeds = successes.len(),
        eval_loss_mean = eval_stats.mean,
        eval_loss_std = eval_stats.std,
        "aggregated configuration"
    );

    Some(ConfigSummary {
        alpha: configuration.alpha,
        description: configuration.description.clone(),
        num_seeds: successes.len(),
        eval_loss_mean: eval_stats.mean,
        eval_loss_std: eval_stats.std,
        train_loss_mean: train_stats.mean,
        train_loss_std: train_stats.std,
        individual_results: successes,
    })
}
