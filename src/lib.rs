//! # Sweepstat: Seed-Replicated Parameter Sweeps with Effect Sizes
//!
//! Sweepstat runs a matrix of gating configurations (alpha × seed) against an
//! external trainer, aggregates final losses across seeds, compares every
//! configuration to the alpha = 0.0 baseline with Cohen's d, profiles
//! inference efficiency, and snapshots the full result record after every
//! unit of work.
//!
//! ## Design Principles
//!
//! - **Failure containment**: a failing or panicking run is recorded, never propagated
//! - **Durability**: every run, summary and measurement is persisted before the next starts
//! - **Reproducible statistics**: order-independent aggregation, guarded divisions
//! - **Narrow collaborators**: trainer and model are traits, resolved once at build time
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sweepstat::collaborator::{
//!     CollaboratorError, TrainOutcome, TrainRequest, Trainer, TrainerCapabilities,
//! };
//! use sweepstat::orchestrator::Orchestrator;
//! use sweepstat::plan::SweepPlan;
//! use sweepstat::store::JsonFileStore;
//!
//! struct MyTrainer;
//!
//! impl Trainer for MyTrainer {
//!     fn run(&self, request: &TrainRequest) -> Result<TrainOutcome, CollaboratorError> {
//!         // train for request.max_steps with request.seed ...
//!         Ok(TrainOutcome { final_eval_loss: 1.8, final_train_loss: 1.6, duration_secs: 0.0 })
//!     }
//!
//!     fn capabilities(&self) -> TrainerCapabilities {
//!         TrainerCapabilities { activation_injection: true }
//!     }
//! }
//!
//! let mut sweep = Orchestrator::builder(
//!     SweepPlan::paper_default(),
//!     MyTrainer,
//!     JsonFileStore::in_dir("experiments/paper_results"),
//! )
//! .resume(true)
//! .build()?;
//!
//! sweep.run_matrix()?;
//! sweep.run_comparison()?;
//! println!("{}", sweep.report());
//! # Ok::<(), sweepstat::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod collaborator;
pub mod compare;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod plan;
pub mod profile;
pub mod record;
pub mod report;
pub mod store;
pub mod telemetry;

pub use error::{Error, Result};
pub use orchestrator::{CancellationToken, Orchestrator, OrchestratorBuilder};
pub use plan::{ExperimentConfiguration, Scheduler, SweepPlan};
pub use report::SweepReport;
