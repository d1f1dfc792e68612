//! End-of-sweep report
//!
//! Plain-text summary of which configurations made it through each stage.
//! Rendering to LaTeX, Markdown or plots is left to downstream tools that
//! read the persisted record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compare::improvement_pct;
use crate::plan::SweepPlan;
use crate::record::{EffectSize, ResultRecord, SweepState};

/// Outcome of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationReport {
    /// Configuration alpha.
    pub alpha: f64,
    /// Configuration description.
    pub description: String,
    /// Seeds that succeeded.
    pub successful_seeds: usize,
    /// Seeds that failed.
    pub failed_seeds: usize,
    /// Whether a summary exists in `nlp_results`.
    pub aggregated: bool,
    /// Whether the configuration took part in the baseline comparison.
    pub in_comparison: bool,
    /// Mean evaluation loss, if aggregated.
    pub eval_loss_mean: Option<f64>,
    /// Mean evaluation perplexity, if aggregated.
    pub perplexity: Option<f64>,
    /// Effect size vs baseline, if compared.
    pub effect_size: Option<EffectSize>,
}

/// Best configuration by mean evaluation loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestConfiguration {
    /// Configuration alpha.
    pub alpha: f64,
    /// Mean evaluation loss.
    pub eval_loss_mean: f64,
    /// Improvement over the baseline, if a baseline summary exists.
    pub improvement_pct: Option<f64>,
}

/// Per-configuration report of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Sweep lifecycle at report time.
    pub state: SweepState,
    /// Rows in plan order.
    pub configurations: Vec<ConfigurationReport>,
    /// Lowest-loss configuration.
    pub best: Option<BestConfiguration>,
}

impl SweepReport {
    /// Build a report for `plan` from the current record.
    #[must_use]
    pub fn from_record(plan: &SweepPlan, record: &ResultRecord) -> Self {
        let compared = !record.statistical_analysis().is_empty();
        let configurations = plan
            .configurations
            .iter()
            .map(|config| {
                let key = config.key();
                let runs = record.runs_for(&key);
                let successful_seeds = runs.iter().filter(|r| r.is_success()).count();
                let summary = record.nlp_results().get(&key);
                let comparison = record.statistical_analysis().get(&key);
                let in_comparison = if config.is_baseline() {
                    compared && summary.is_some()
                } else {
                    comparison.is_some()
                };
                ConfigurationReport {
                    alpha: config.alpha,
                    description: config.description.clone(),
                    successful_seeds,
                    failed_seeds: runs.len() - successful_seeds,
                    aggregated: summary.is_some(),
                    in_comparison,
                    eval_loss_mean: summary.map(|s| s.eval_loss_mean),
                    perplexity: summary.and_then(|s| s.mean_perplexity()),
                    effect_size: comparison.map(|c| c.effect_size),
                }
            })
            .collect();

        let baseline_mean = record
            .nlp_results()
            .values()
            .find(|s| s.is_baseline())
            .map(|s| s.eval_loss_mean);
        let best = record.best_configuration().map(|s| BestConfiguration {
            alpha: s.alpha,
            eval_loss_mean: s.eval_loss_mean,
            improvement_pct: baseline_mean.map(|b| improvement_pct(b, s.eval_loss_mean)),
        });

        Self {
            state: record.metadata().state,
            configurations,
            best,
        }
    }

    /// Total failed seeds across configurations.
    #[must_use]
    pub fn failed_runs(&self) -> usize {
        self.configurations.iter().map(|c| c.failed_seeds).sum()
    }

    /// Total attempted seeds across configurations.
    #[must_use]
    pub fn attempted_runs(&self) -> usize {
        self.configurations
            .iter()
            .map(|c| c.successful_seeds + c.failed_seeds)
            .sum()
    }
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{v:.precision$}"))
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>6} {:>4} {:>6} {:>10} {:>10} {:>9} {:>10}",
            "alpha", "ok", "failed", "eval_loss", "perplexity", "compared", "effect"
        )?;
        for row in &self.configurations {
            writeln!(
                f,
                "{:>6.2} {:>4} {:>6} {:>10} {:>10} {:>9} {:>10}",
                row.alpha,
                row.successful_seeds,
                row.failed_seeds,
                opt(row.eval_loss_mean, 4),
                opt(row.perplexity, 2),
                if row.in_comparison { "yes" } else { "no" },
                row.effect_size.map_or("--", EffectSize::as_str),
            )?;
        }
        match &self.best {
            Some(best) => write!(
                f,
                "best: alpha={} eval_loss={:.4} improvement={}%",
                best.alpha,
                best.eval_loss_mean,
                opt(best.improvement_pct, 2)
            ),
            None => write!(f, "best: --"),
        }
    }
}
