//! Sweep plan - the static configuration matrix
//!
//! A plan is read once before the sweep starts and never mutated afterwards.
//! It can be built in code or loaded from JSON:
//!
//! ```rust
//! use sweepstat::plan::SweepPlan;
//!
//! let plan = SweepPlan::from_json_str(r#"{
//!     "configurations": [
//!         {"alpha": 0.0, "description": "Baseline"},
//!         {"alpha": 0.5, "description": "Moderate gating"}
//!     ],
//!     "seeds": [1, 2]
//! }"#)?;
//!
//! assert_eq!(plan.max_steps, 3000);
//! assert_eq!(plan.seeds, vec![1, 2]);
//! # Ok::<(), sweepstat::Error>(())
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One point in the parameter sweep, identified by its alpha value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfiguration {
    /// Gating intensity; 0.0 is the baseline.
    pub alpha: f64,
    /// Human-readable label.
    #[serde(default)]
    pub description: String,
}

impl ExperimentConfiguration {
    /// Create a configuration.
    #[must_use]
    pub fn new(alpha: f64, description: impl Into<String>) -> Self {
        Self {
            alpha,
            description: description.into(),
        }
    }

    /// Stable key used in every map of the persisted record.
    #[must_use]
    pub fn key(&self) -> String {
        config_key(self.alpha)
    }

    /// Whether this is the alpha = 0.0 reference configuration.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.alpha == 0.0
    }
}

/// Record key for a configuration alpha (`alpha_0.5`).
#[must_use]
pub fn config_key(alpha: f64) -> String {
    // -0.0 and 0.0 are the same configuration
    let alpha = if alpha == 0.0 { 0.0 } else { alpha };
    format!("alpha_{alpha:?}")
}

/// How seed executions of one configuration are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheduler {
    /// One run at a time, seeds in plan order.
    #[default]
    Sequential,
    /// Seeds of a configuration run concurrently (requires the `rayon` feature).
    ParallelSeeds,
}

/// Full description of a sweep: configurations, seeds and phase budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Configurations in matrix order.
    pub configurations: Vec<ExperimentConfiguration>,
    /// Replicate seeds, run in order for every configuration.
    #[serde(default = "SweepPlan::default_seeds")]
    pub seeds: Vec<u64>,
    /// Training step budget handed to the trainer.
    #[serde(default = "SweepPlan::default_max_steps")]
    pub max_steps: u64,
    /// Discarded forward passes before timing.
    #[serde(default = "SweepPlan::default_warmup_iters")]
    pub warmup_iters: usize,
    /// Timed forward passes.
    #[serde(default = "SweepPlan::default_timed_iters")]
    pub timed_iters: usize,
    /// Token ids fed to every profiled model.
    #[serde(default = "SweepPlan::default_input_sample")]
    pub input_sample: Vec<u32>,
    /// Seed scheduling.
    #[serde(default)]
    pub scheduler: Scheduler,
}

impl SweepPlan {
    fn default_seeds() -> Vec<u64> {
        vec![42, 123, 456]
    }

    const fn default_max_steps() -> u64 {
        3000
    }

    const fn default_warmup_iters() -> usize {
        10
    }

    const fn default_timed_iters() -> usize {
        100
    }

    fn default_input_sample() -> Vec<u32> {
        // "The quick brown fox jumps over the lazy dog" under the GPT-2 vocabulary
        vec![464, 2068, 7586, 21831, 18045, 625, 262, 16931, 3290]
    }

    /// Plan with the given configurations and every other field at its default.
    #[must_use]
    pub fn new(configurations: Vec<ExperimentConfiguration>) -> Self {
        Self {
            configurations,
            seeds: Self::default_seeds(),
            max_steps: Self::default_max_steps(),
            warmup_iters: Self::default_warmup_iters(),
            timed_iters: Self::default_timed_iters(),
            input_sample: Self::default_input_sample(),
            scheduler: Scheduler::default(),
        }
    }

    /// The five-point gating sweep used for the published results.
    #[must_use]
    pub fn paper_default() -> Self {
        Self::new(vec![
            ExperimentConfiguration::new(0.0, "Baseline (alpha=0.0, no gating)"),
            ExperimentConfiguration::new(0.3, "paGLU (alpha=0.3, light gating)"),
            ExperimentConfiguration::new(0.5, "paGLU (alpha=0.5, moderate gating)"),
            ExperimentConfiguration::new(0.7, "paGLU (alpha=0.7, strong gating)"),
            ExperimentConfiguration::new(1.0, "GLU (alpha=1.0, full gating)"),
        ])
    }

    /// Replace the seed list.
    #[must_use]
    pub fn with_seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Replace the training step budget.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Replace the profiling iteration counts.
    #[must_use]
    pub const fn with_profiling(mut self, warmup_iters: usize, timed_iters: usize) -> Self {
        self.warmup_iters = warmup_iters;
        self.timed_iters = timed_iters;
        self
    }

    /// Replace the seed scheduler.
    #[must_use]
    pub const fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Parse a plan from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the plan is invalid
    pub fn from_json_str(json: &str) -> Result<Self> {
        let plan: Self = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load and validate a plan from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the plan is invalid
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// The baseline configuration, if the plan has one.
    #[must_use]
    pub fn baseline(&self) -> Option<&ExperimentConfiguration> {
        self.configurations.iter().find(|c| c.is_baseline())
    }

    /// Total number of (configuration, seed) pairs.
    #[must_use]
    pub fn total_runs(&self) -> usize {
        self.configurations.len() * self.seeds.len()
    }

    /// Check structural constraints.
    ///
    /// A plan without a baseline is valid; the comparison phase simply
    /// yields no results for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlan`] describing the first violated constraint
    pub fn validate(&self) -> Result<()> {
        if self.configurations.is_empty() {
            return Err(Error::InvalidPlan("no configurations".to_string()));
        }
        if self.seeds.is_empty() {
            return Err(Error::InvalidPlan("no seeds".to_string()));
        }
        if self.max_steps == 0 {
            return Err(Error::InvalidPlan("max_steps must be positive".to_string()));
        }
        if self.timed_iters == 0 {
            return Err(Error::InvalidPlan("timed_iters must be positive".to_string()));
        }

        let mut seen_seeds = HashSet::new();
        for seed in &self.seeds {
            if !seen_seeds.insert(*seed) {
                return Err(Error::InvalidPlan(format!("duplicate seed {seed}")));
            }
        }

        let mut seen_keys = HashSet::new();
        for config in &self.configurations {
            if !config.alpha.is_finite() {
                return Err(Error::InvalidPlan(format!(
                    "alpha must be finite, got {}",
                    config.alpha
                )));
            }
            if !seen_keys.insert(config.key()) {
                return Err(Error::InvalidPlan(format!(
                    "duplicate configuration alpha={}",
                    config.alpha
                )));
            }
        }

        #[cfg(not(feature = "rayon"))]
        if self.scheduler == Scheduler::ParallelSeeds {
            return Err(Error::InvalidPlan(
                "parallel_seeds scheduler requires the `rayon` feature".to_string(),
            ));
        }

        Ok(())
    }
}
