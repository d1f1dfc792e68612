//! Config Summary - cross-seed statistics for one configuration

use serde::{Deserialize, Serialize};

use super::RunResult;

/// Cross-seed statistics of one configuration.
///
/// Built by [`aggregate`](crate::aggregate::aggregate); `num_seeds` always
/// equals the number of successful runs in `individual_results`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSummary {
    /// Configuration alpha.
    pub alpha: f64,
    /// Configuration description.
    pub description: String,
    /// Count of successful seeds.
    pub num_seeds: usize,
    /// Mean final evaluation loss.
    pub eval_loss_mean: f64,
    /// Population standard deviation of final evaluation loss.
    pub eval_loss_std: f64,
    /// Mean final training loss.
    pub train_loss_mean: f64,
    /// Population standard deviation of final training loss.
    pub train_loss_std: f64,
    /// Successful runs in arrival order.
    pub individual_results: Vec<RunResult>,
}

impl ConfigSummary {
    /// Whether this summarizes the alpha = 0.0 baseline.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.alpha == 0.0
    }

    /// Mean evaluation perplexity across seeds, `exp` taken per run.
    #[must_use]
    pub fn mean_perplexity(&self) -> Option<f64> {
        if self.individual_results.is_empty() {
            return None;
        }
        let total: f64 = self
            .individual_results
            .iter()
            .filter_map(RunResult::eval_perplexity)
            .sum();
        #[allow(clippy::cast_precision_loss)]
        Some(total / self.individual_results.len() as f64)
    }
}
