//! Run Result - outcome of one (configuration, seed) execution

use serde::{Deserialize, Serialize};

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Trainer returned final losses.
    Success,
    /// Trainer failed; the error message is recorded.
    Failed,
}

/// Run Result records one execution attempt.
///
/// Immutable once created: fields are private and only readable through
/// accessors. Loss fields are `None` on failed runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    alpha: f64,
    seed: u64,
    #[serde(default)]
    description: String,
    max_steps: u64,
    status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_eval_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_train_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    eval_perplexity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RunResult {
    /// Create a successful run. Perplexity is derived as `exp(eval_loss)`
    /// and left unset when that overflows.
    ///
    /// # Arguments
    ///
    /// * `duration_secs` - Wall-clock training time in seconds
    #[must_use]
    pub fn success(
        alpha: f64,
        seed: u64,
        description: impl Into<String>,
        max_steps: u64,
        eval_loss: f64,
        train_loss: f64,
        duration_secs: f64,
    ) -> Self {
        Self {
            alpha,
            seed,
            description: description.into(),
            max_steps,
            status: RunStatus::Success,
            final_eval_loss: Some(eval_loss),
            final_train_loss: Some(train_loss),
            duration: Some(duration_secs),
            eval_perplexity: Some(eval_loss.exp()).filter(|ppl| ppl.is_finite()),
            error: None,
        }
    }

    /// Create a failed run carrying the collaborator's error message.
    #[must_use]
    pub fn failed(
        alpha: f64,
        seed: u64,
        description: impl Into<String>,
        max_steps: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            alpha,
            seed,
            description: description.into(),
            max_steps,
            status: RunStatus::Failed,
            final_eval_loss: None,
            final_train_loss: None,
            duration: None,
            eval_perplexity: None,
            error: Some(error.into()),
        }
    }

    /// Configuration alpha.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Replicate seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration description at the time of the run.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Step budget handed to the trainer.
    #[must_use]
    pub const fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Final status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Whether the run succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Final evaluation loss (success only).
    #[must_use]
    pub const fn final_eval_loss(&self) -> Option<f64> {
        self.final_eval_loss
    }

    /// Final training loss (success only).
    #[must_use]
    pub const fn final_train_loss(&self) -> Option<f64> {
        self.final_train_loss
    }

    /// Training wall-clock duration in seconds (success only).
    #[must_use]
    pub const fn duration_secs(&self) -> Option<f64> {
        self.duration
    }

    /// `exp(eval_loss)` (success only).
    #[must_use]
    pub const fn eval_perplexity(&self) -> Option<f64> {
        self.eval_perplexity
    }

    /// Failure reason (failed only).
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_derives_perplexity() {
        let run = RunResult::success(0.5, 42, "moderate", 100, 2.0, 2.5, 1.0);
        assert!(run.is_success());
        let ppl = run.eval_perplexity().unwrap();
        assert!((ppl - 2.0_f64.exp()).abs() < 1e-12);
        assert!(run.error().is_none());
    }

    #[test]
    fn test_overflowing_perplexity_is_unset() {
        let run = RunResult::success(0.5, 42, "moderate", 100, 800.0, 2.5, 1.0);
        assert!(run.eval_perplexity().is_none());
        assert_eq!(run.final_eval_loss(), Some(800.0));
    }

    #[test]
    fn test_failed_has_no_losses() {
        let run = RunResult::failed(0.5, 42, "moderate", 100, "boom");
        assert_eq!(run.status(), RunStatus::Failed);
        assert!(run.final_eval_loss().is_none());
        assert!(run.eval_perplexity().is_none());
        assert_eq!(run.error(), Some("boom"));
    }

    #[test]
    fn test_failed_serializes_without_loss_fields() {
        let run = RunResult::failed(0.5, 42, "moderate", 100, "boom");
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("final_eval_loss").is_none());
        assert_eq!(json["error"], "boom");
    }
}
