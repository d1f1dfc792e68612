//! Sweep orchestration
//!
//! Phases run strictly in order and never overlap:
//!
//! ```text
//! run_matrix      config × seed → RunExecutor → ledger → aggregate → nlp_results
//! run_comparison  nlp_results → compare → statistical_analysis
//! run_efficiency  config → EfficiencyProfiler → efficiency_results
//! ```
//!
//! The record is persisted after every run, every finished configuration,
//! the comparison and every profiled configuration. A failed snapshot aborts
//! the sweep; a failed run never does.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::collaborator::{EfficiencyHarness, Trainer};
use crate::compare::compare;
use crate::executor::RunExecutor;
use crate::plan::{ExperimentConfiguration, Scheduler, SweepPlan};
use crate::profile::EfficiencyProfiler;
use crate::record::{ResultRecord, RunResult, SweepState};
use crate::report::SweepReport;
use crate::store::ResultStore;
use crate::{Error, Result};

/// Cooperative stop signal, checked only between runs.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the sweep to stop at the next run boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives a [`SweepPlan`] against a trainer and persists into a store.
pub struct Orchestrator<T: Trainer, S: ResultStore> {
    plan: SweepPlan,
    trainer: T,
    store: S,
    record: ResultRecord,
    cancel: CancellationToken,
}

impl<T: Trainer, S: ResultStore> Orchestrator<T, S> {
    /// Create a builder with the required collaborators.
    #[must_use]
    pub fn builder(plan: SweepPlan, trainer: T, store: S) -> OrchestratorBuilder<T, S> {
        OrchestratorBuilder::new(plan, trainer, store)
    }

    /// The plan being executed.
    #[must_use]
    pub const fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Current in-memory record (identical to the last snapshot after each phase step).
    #[must_use]
    pub const fn record(&self) -> &ResultRecord {
        &self.record
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Token that stops this sweep at the next run boundary.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Consume the orchestrator, returning the record and the store.
    #[must_use]
    pub fn into_parts(self) -> (ResultRecord, S) {
        (self.record, self.store)
    }

    /// Whether the sweep was stopped by its cancellation token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.record.metadata().state == SweepState::Cancelled
    }

    /// Execute every outstanding (configuration, seed) pair.
    ///
    /// Configurations already completed in a resumed record are skipped, as
    /// are seeds already present in the run ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if a snapshot cannot be written
    pub fn run_matrix(&mut self) -> Result<()> {
        info!(
            configurations = self.plan.configurations.len(),
            seeds = self.plan.seeds.len(),
            total_runs = self.plan.total_runs(),
            max_steps = self.plan.max_steps,
            "starting experiment matrix"
        );
        self.persist()?;

        let configurations = self.plan.configurations.clone();
        for configuration in &configurations {
            let key = configuration.key();
            if self.record.is_completed(&key) {
                debug!(alpha = configuration.alpha, "configuration already completed, skipping");
                continue;
            }

            let pending: Vec<u64> = self
                .plan
                .seeds
                .iter()
                .copied()
                .filter(|seed| !self.record.has_run(&key, *seed))
                .collect();

            if !self.run_seeds(configuration, &pending)? {
                return Ok(());
            }

            let summary = aggregate(configuration, self.record.runs_for(&key));
            self.record.complete_configuration(&key, summary);
            self.persist()?;
        }

        info!("experiment matrix finished");
        Ok(())
    }

    /// Compare every aggregated configuration against the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the snapshot cannot be written
    pub fn run_comparison(&mut self) -> Result<()> {
        info!(summaries = self.record.nlp_results().len(), "starting statistical analysis");
        let analysis = compare(self.record.nlp_results());
        self.record.set_statistical_analysis(analysis);
        self.persist()
    }

    /// Profile inference efficiency of every configuration.
    ///
    /// A configuration that cannot be profiled is left out of
    /// `efficiency_results`; the phase continues with the next one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if a snapshot cannot be written
    pub fn run_efficiency<H: EfficiencyHarness>(&mut self, harness: &mut H) -> Result<()> {
        info!(backend = harness.backend(), "starting efficiency analysis");
        // Counters from the training phase must not leak into measurements
        harness.reset_peak_memory();

        let configurations = self.plan.configurations.clone();
        for configuration in &configurations {
            if self.cancel.is_cancelled() {
                return self.stop();
            }
            let key = configuration.key();
            if self.record.efficiency_results().contains_key(&key) {
                debug!(alpha = configuration.alpha, "configuration already profiled, skipping");
                continue;
            }

            let measured = EfficiencyProfiler::new(harness).profile(
                configuration,
                &self.plan.input_sample,
                self.plan.warmup_iters,
                self.plan.timed_iters,
            );
            match measured {
                Ok(measurement) => {
                    self.record.insert_efficiency(&key, measurement);
                    self.persist()?;
                }
                Err(err) => {
                    warn!(
                        alpha = configuration.alpha,
                        error = %err,
                        "efficiency profiling failed, configuration omitted"
                    );
                }
            }
        }

        harness.reset_peak_memory();
        info!(
            profiled = self.record.efficiency_results().len(),
            "efficiency analysis finished"
        );
        Ok(())
    }

    /// Run every phase and return the final report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if any snapshot cannot be written
    pub fn run_all<H: EfficiencyHarness>(&mut self, harness: &mut H) -> Result<SweepReport> {
        self.run_matrix()?;
        if !self.is_cancelled() {
            self.run_comparison()?;
            self.run_efficiency(harness)?;
        }
        if !self.is_cancelled() {
            self.record.set_state(SweepState::Completed);
            self.persist()?;
        }

        let report = SweepReport::from_record(&self.plan, &self.record);
        info!("sweep finished\n{report}");
        Ok(report)
    }

    /// Final report of the current record.
    #[must_use]
    pub fn report(&self) -> SweepReport {
        SweepReport::from_record(&self.plan, &self.record)
    }

    /// Run the pending seeds of one configuration. Returns `false` if cancelled.
    fn run_seeds(
        &mut self,
        configuration: &ExperimentConfiguration,
        seeds: &[u64],
    ) -> Result<bool> {
        match self.plan.scheduler {
            Scheduler::Sequential => {
                for &seed in seeds {
                    if self.cancel.is_cancelled() {
                        self.stop()?;
                        return Ok(false);
                    }
                    let run = RunExecutor::new(&self.trainer).execute(
                        configuration,
                        seed,
                        self.plan.max_steps,
                    );
                    self.record_run(run)?;
                }
                Ok(true)
            }
            Scheduler::ParallelSeeds => self.run_seeds_parallel(configuration, seeds),
        }
    }

    #[cfg(feature = "rayon")]
    fn run_seeds_parallel(
        &mut self,
        configuration: &ExperimentConfiguration,
        seeds: &[u64],
    ) -> Result<bool> {
        use rayon::prelude::*;

        if self.cancel.is_cancelled() {
            self.stop()?;
            return Ok(false);
        }
        let executor = RunExecutor::new(&self.trainer);
        let max_steps = self.plan.max_steps;
        let runs: Vec<RunResult> = seeds
            .par_iter()
            .map(|&seed| executor.execute(configuration, seed, max_steps))
            .collect();

        // Recorded in seed order regardless of completion order
        for run in runs {
            self.record_run(run)?;
        }
        Ok(true)
    }

    #[cfg(not(feature = "rayon"))]
    fn run_seeds_parallel(
        &mut self,
        _configuration: &ExperimentConfiguration,
        _seeds: &[u64],
    ) -> Result<bool> {
        Err(Error::InvalidPlan(
            "parallel_seeds scheduler requires the `rayon` feature".to_string(),
        ))
    }

    fn record_run(&mut self, run: RunResult) -> Result<()> {
        self.record.record_run(run);
        self.persist()
    }

    fn stop(&mut self) -> Result<()> {
        warn!("cancellation requested, stopping at run boundary");
        self.record.set_state(SweepState::Cancelled);
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        self.store.persist(&self.record)
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder<T: Trainer, S: ResultStore> {
    plan: SweepPlan,
    trainer: T,
    store: S,
    backend: String,
    resume: bool,
    cancel: CancellationToken,
}

impl<T: Trainer, S: ResultStore> OrchestratorBuilder<T, S> {
    /// Create a builder with required fields.
    #[must_use]
    pub fn new(plan: SweepPlan, trainer: T, store: S) -> Self {
        Self {
            plan,
            trainer,
            store,
            backend: "cpu".to_string(),
            resume: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the compute backend label recorded in metadata.
    #[must_use]
    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Continue from the store's last snapshot if there is one.
    #[must_use]
    pub const fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Validate the plan, resolve trainer capabilities and load the starting record.
    ///
    /// # Errors
    ///
    /// Returns error if the plan is invalid, the trainer cannot run one of its
    /// configurations, or a resumed snapshot cannot be loaded or belongs to a
    /// different plan
    pub fn build(self) -> Result<Orchestrator<T, S>> {
        self.plan.validate()?;

        let capabilities = self.trainer.capabilities();
        if !capabilities.activation_injection {
            if let Some(config) = self.plan.configurations.iter().find(|c| !c.is_baseline()) {
                return Err(Error::MissingCapability {
                    capability: "activation_injection",
                    alpha: config.alpha,
                });
            }
        }

        let loaded = if self.resume { self.store.load()? } else { None };
        let record = match loaded {
            Some(mut record) => {
                let metadata = record.metadata();
                if metadata.seeds != self.plan.seeds || metadata.max_steps != self.plan.max_steps {
                    return Err(Error::InvalidPlan(format!(
                        "snapshot was produced with seeds {:?} and max_steps {}, \
                         plan has seeds {:?} and max_steps {}",
                        metadata.seeds, metadata.max_steps, self.plan.seeds, self.plan.max_steps
                    )));
                }
                let unknown = unplanned_keys(&self.plan, &record);
                if !unknown.is_empty() {
                    return Err(Error::InvalidPlan(format!(
                        "snapshot holds configurations missing from the plan: {}",
                        unknown.join(", ")
                    )));
                }
                info!(
                    completed = metadata.completed_configurations.len(),
                    runs = record.runs().values().map(Vec::len).sum::<usize>(),
                    "resuming from snapshot"
                );
                record.set_state(SweepState::Running);
                record
            }
            None => ResultRecord::new(self.backend, self.plan.seeds.clone(), self.plan.max_steps),
        };

        Ok(Orchestrator {
            plan: self.plan,
            trainer: self.trainer,
            store: self.store,
            record,
            cancel: self.cancel,
        })
    }
}

/// Configuration keys present anywhere in `record` but absent from `plan`, sorted.
fn unplanned_keys(plan: &SweepPlan, record: &ResultRecord) -> Vec<String> {
    let planned: BTreeSet<String> = plan
        .configurations
        .iter()
        .map(ExperimentConfiguration::key)
        .collect();
    let recorded: BTreeSet<&String> = record
        .runs()
        .keys()
        .chain(record.nlp_results().keys())
        .chain(record.statistical_analysis().keys())
        .chain(record.efficiency_results().keys())
        .chain(record.metadata().completed_configurations.iter())
        .collect();
    recorded
        .into_iter()
        .filter(|key| !planned.contains(*key))
        .cloned()
        .collect()
}
