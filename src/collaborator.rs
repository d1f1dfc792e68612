//! External collaborator interfaces
//!
//! The sweep never looks inside the trainer or the model. It only relies on
//! the traits below, which an integration implements once:
//!
//! - [`Trainer`] trains one configuration for one seed and reports final losses
//! - [`EfficiencyHarness`] builds inference-only model instances for profiling
//! - [`ModelHandle`] is one such instance
//!
//! Failures cross this boundary as [`CollaboratorError`] values.

use std::fmt;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError {
    reason: String,
}

impl CollaboratorError {
    /// Create an error with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The failure reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for CollaboratorError {}

impl From<String> for CollaboratorError {
    fn from(reason: String) -> Self {
        Self::new(reason)
    }
}

impl From<&str> for CollaboratorError {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

/// Parameters of one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainRequest {
    /// Gating intensity.
    pub alpha: f64,
    /// Replicate seed.
    pub seed: u64,
    /// Step budget.
    pub max_steps: u64,
}

/// Final metrics of a successful training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOutcome {
    /// Evaluation loss after the last step.
    pub final_eval_loss: f64,
    /// Training loss after the last step.
    pub final_train_loss: f64,
    /// Wall-clock training time in seconds, as measured by the trainer.
    pub duration_secs: f64,
}

/// Capabilities a trainer declares up front.
///
/// Resolved once when the orchestrator is built, never probed per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainerCapabilities {
    /// The trainer can inject the gated activation for alpha != 0.0.
    pub activation_injection: bool,
}

/// Trains one (alpha, seed) pair.
///
/// Implementations must be safe to call from several threads when the
/// parallel seed scheduler is used.
pub trait Trainer: Send + Sync {
    /// Train with the given request and report final losses.
    ///
    /// # Errors
    ///
    /// Any failure of the run; it is recorded and the sweep continues.
    fn run(&self, request: &TrainRequest) -> Result<TrainOutcome, CollaboratorError>;

    /// Declared capabilities. Defaults to a trainer that can only run the baseline.
    fn capabilities(&self) -> TrainerCapabilities {
        TrainerCapabilities::default()
    }
}

/// One inference-only model instance.
pub trait ModelHandle {
    /// Run a forward pass. Must not change model state.
    ///
    /// # Errors
    ///
    /// Any backend failure during the pass.
    fn forward(&self, input: &[u32]) -> Result<Vec<f32>, CollaboratorError>;

    /// Number of parameters of the instance.
    fn parameter_count(&self) -> u64;
}

/// Builds model instances for the efficiency phase.
pub trait EfficiencyHarness {
    /// Backend label recorded in measurements and metadata.
    fn backend(&self) -> &str;

    /// Construct an inference-only model for `alpha`.
    ///
    /// # Errors
    ///
    /// Failure to construct or place the model.
    fn load(&mut self, alpha: f64) -> Result<Box<dyn ModelHandle>, CollaboratorError>;

    /// Peak memory since the last reset, or `None` if the backend cannot report it.
    fn peak_memory_mb(&self) -> Option<f64> {
        None
    }

    /// Reset the peak memory counter.
    fn reset_peak_memory(&mut self) {}
}
