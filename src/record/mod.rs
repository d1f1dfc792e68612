//! Result record schema
//!
//! The persisted document is a single JSON object that downstream report
//! generators read without ever writing to it:
//!
//! ```text
//! ResultRecord
//!   ├── metadata
//!   ├── runs                 { alpha_0.5: [RunResult, ...] }      every attempt
//!   ├── nlp_results          { alpha_0.5: ConfigSummary }         finished configs
//!   ├── statistical_analysis { alpha_0.5: ComparisonResult }      vs alpha_0.0
//!   └── efficiency_results   { alpha_0.5: EfficiencyMeasurement }
//! ```
//!
//! A key missing from any map means "not yet available".
//!
//! ## Usage
//!
//! ```rust
//! use sweepstat::record::{ResultRecord, RunResult, RunStatus};
//!
//! let mut record = ResultRecord::new("cpu", vec![1, 2], 100);
//! record.record_run(RunResult::success(0.0, 1, "baseline", 100, 1.0, 1.2, 3.5));
//! record.record_run(RunResult::failed(0.0, 2, "baseline", 100, "out of memory"));
//!
//! let runs = record.runs_for("alpha_0.0");
//! assert_eq!(runs.len(), 2);
//! assert_eq!(runs[1].status(), RunStatus::Failed);
//! ```

mod comparison_result;
mod config_summary;
mod efficiency_measurement;
mod result_record;
mod run_result;

pub use comparison_result::{ComparisonResult, EffectSize};
pub use config_summary::ConfigSummary;
pub use efficiency_measurement::EfficiencyMeasurement;
pub use result_record::{Metadata, ResultRecord, SweepState};
pub use run_result::{RunResult, RunStatus};
