//! Result Record - root aggregate of a sweep

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ComparisonResult, ConfigSummary, EfficiencyMeasurement, RunResult};
use crate::plan::config_key;

/// Lifecycle of the sweep that owns a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepState {
    /// Work is still outstanding.
    #[default]
    Running,
    /// Stopped at a run boundary on request.
    Cancelled,
    /// Every phase finished.
    Completed,
}

/// Provenance of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    /// When the sweep started.
    pub timestamp: DateTime<Utc>,
    /// Last snapshot time.
    pub updated_at: DateTime<Utc>,
    /// Compute backend label (`cpu`, `cuda`, `mps`, ...).
    pub backend: String,
    /// Version of this crate that produced the record.
    pub crate_version: String,
    /// Seeds of the plan.
    pub seeds: Vec<u64>,
    /// Training step budget of the plan.
    pub max_steps: u64,
    /// Sweep lifecycle.
    #[serde(default)]
    pub state: SweepState,
    /// Configuration keys whose seed loop has finished.
    #[serde(default)]
    pub completed_configurations: Vec<String>,
}

/// Root aggregate of a sweep, persisted as one JSON document.
///
/// ## Design
///
/// `runs` is the ledger of every attempt and is updated after each run, so a
/// crash mid-configuration loses at most the in-flight run. `nlp_results`
/// only ever holds summaries of configurations whose seed loop finished;
/// readers never see a placeholder for a configuration still in progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    metadata: Metadata,
    #[serde(default)]
    runs: BTreeMap<String, Vec<RunResult>>,
    #[serde(default)]
    nlp_results: BTreeMap<String, ConfigSummary>,
    #[serde(default)]
    efficiency_results: BTreeMap<String, EfficiencyMeasurement>,
    #[serde(default)]
    statistical_analysis: BTreeMap<String, ComparisonResult>,
}

impl ResultRecord {
    /// Create an empty record stamped with the current time.
    #[must_use]
    pub fn new(backend: impl Into<String>, seeds: Vec<u64>, max_steps: u64) -> Self {
        let now = Utc::now();
        Self {
            metadata: Metadata {
                timestamp: now,
                updated_at: now,
                backend: backend.into(),
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
                seeds,
                max_steps,
                state: SweepState::Running,
                completed_configurations: Vec::new(),
            },
            runs: BTreeMap::new(),
            nlp_results: BTreeMap::new(),
            efficiency_results: BTreeMap::new(),
            statistical_analysis: BTreeMap::new(),
        }
    }

    /// Sweep provenance.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Every recorded attempt, per configuration key.
    #[must_use]
    pub const fn runs(&self) -> &BTreeMap<String, Vec<RunResult>> {
        &self.runs
    }

    /// Attempts recorded for one configuration key.
    #[must_use]
    pub fn runs_for(&self, key: &str) -> &[RunResult] {
        self.runs.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether a (configuration, seed) pair was already attempted.
    #[must_use]
    pub fn has_run(&self, key: &str, seed: u64) -> bool {
        self.runs_for(key).iter().any(|run| run.seed() == seed)
    }

    /// Summaries of finished configurations with at least one success.
    #[must_use]
    pub const fn nlp_results(&self) -> &BTreeMap<String, ConfigSummary> {
        &self.nlp_results
    }

    /// Baseline comparisons of every non-baseline summary.
    #[must_use]
    pub const fn statistical_analysis(&self) -> &BTreeMap<String, ComparisonResult> {
        &self.statistical_analysis
    }

    /// Efficiency measurements per configuration key.
    #[must_use]
    pub const fn efficiency_results(&self) -> &BTreeMap<String, EfficiencyMeasurement> {
        &self.efficiency_results
    }

    /// Summary for one configuration alpha.
    #[must_use]
    pub fn summary(&self, alpha: f64) -> Option<&ConfigSummary> {
        self.nlp_results.get(&config_key(alpha))
    }

    /// Comparison for one configuration alpha.
    #[must_use]
    pub fn comparison(&self, alpha: f64) -> Option<&ComparisonResult> {
        self.statistical_analysis.get(&config_key(alpha))
    }

    /// Efficiency measurement for one configuration alpha.
    #[must_use]
    pub fn efficiency(&self, alpha: f64) -> Option<&EfficiencyMeasurement> {
        self.efficiency_results.get(&config_key(alpha))
    }

    /// Whether the seed loop of a configuration key has finished.
    #[must_use]
    pub fn is_completed(&self, key: &str) -> bool {
        self.metadata
            .completed_configurations
            .iter()
            .any(|k| k == key)
    }

    /// Summary with the lowest mean evaluation loss.
    #[must_use]
    pub fn best_configuration(&self) -> Option<&ConfigSummary> {
        self.nlp_results
            .values()
            .min_by(|a, b| a.eval_loss_mean.total_cmp(&b.eval_loss_mean))
    }

    /// Append a run to its configuration's ledger.
    pub fn record_run(&mut self, run: RunResult) {
        self.runs
            .entry(config_key(run.alpha()))
            .or_default()
            .push(run);
        self.touch();
    }

    /// Close a configuration's seed loop, storing its summary if it has one.
    pub fn complete_configuration(&mut self, key: &str, summary: Option<ConfigSummary>) {
        match summary {
            Some(summary) => {
                self.nlp_results.insert(key.to_string(), summary);
            }
            None => {
                self.nlp_results.remove(key);
            }
        }
        if !self.is_completed(key) {
            self.metadata.completed_configurations.push(key.to_string());
        }
        self.touch();
    }

    /// Replace the comparison results.
    pub fn set_statistical_analysis(&mut self, analysis: BTreeMap<String, ComparisonResult>) {
        self.statistical_analysis = analysis;
        self.touch();
    }

    /// Store one configuration's efficiency measurement.
    pub fn insert_efficiency(&mut self, key: &str, measurement: EfficiencyMeasurement) {
        self.efficiency_results.insert(key.to_string(), measurement);
        self.touch();
    }

    /// Update the sweep lifecycle state.
    pub fn set_state(&mut self, state: SweepState) {
        self.metadata.state = state;
        self.touch();
    }

    fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}
