//! Error types for sweepstat
//!
//! Only conditions that must stop the sweep live here. A failing training run
//! is not an error: it is recorded as a failed [`RunResult`](crate::record::RunResult).

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Sweepstat error types
#[derive(Error, Debug)]
pub enum Error {
    /// Sweep plan failed validation
    #[error("Invalid sweep plan: {0}\nFix the plan before starting the matrix.")]
    InvalidPlan(String),

    /// Trainer cannot express a configuration in the plan
    #[error("Trainer lacks capability `{capability}` required by alpha={alpha}\nRemove the configuration or use a trainer that supports it.")]
    MissingCapability {
        /// Capability name
        capability: &'static str,
        /// First configuration that needs it
        alpha: f64,
    },

    /// Durable write of the result record failed (fatal)
    #[error("Persistence failed: {0}\nResults after the last successful snapshot are not durable; aborting.")]
    Persistence(String),

    /// Efficiency profiling failed for one configuration
    #[error("Profiling alpha={alpha} failed: {reason}")]
    Profiling {
        /// Configuration alpha
        alpha: f64,
        /// Failure description
        reason: String,
    },

    /// JSON encode/decode error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
