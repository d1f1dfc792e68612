//! Run executor - one (configuration, seed) execution with failure containment
//!
//! Whatever the trainer does, [`RunExecutor::execute`] returns a
//! [`RunResult`]. Errors, panics and non-finite losses all become failed runs
//! so that one bad run never aborts the rest of the matrix.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{info, warn};

use crate::collaborator::{TrainOutcome, TrainRequest, Trainer};
use crate::plan::ExperimentConfiguration;
use crate::record::RunResult;

/// Executes single runs against a [`Trainer`].
#[derive(Debug)]
pub struct RunExecutor<'a, T: Trainer> {
    trainer: &'a T,
}

impl<'a, T: Trainer> RunExecutor<'a, T> {
    /// Wrap a trainer.
    #[must_use]
    pub const fn new(trainer: &'a T) -> Self {
        Self { trainer }
    }

    /// Execute one run. Never fails; failures are recorded in the result.
    #[must_use]
    pub fn execute(
        &self,
        configuration: &ExperimentConfiguration,
        seed: u64,
        max_steps: u64,
    ) -> RunResult {
        let request = TrainRequest {
            alpha: configuration.alpha,
            seed,
            max_steps,
        };
        info!(
            alpha = configuration.alpha,
            seed,
            max_steps,
            description = %configuration.description,
            "starting run"
        );

        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.trainer.run(&request)));
        let elapsed = started.elapsed().as_secs_f64();

        let failure = match outcome {
            Ok(Ok(outcome)) => match check_outcome(&outcome) {
                Ok(()) => {
                    // Trainers that do not time themselves report zero
                    let duration = if outcome.duration_secs > 0.0 {
                        outcome.duration_secs
                    } else {
                        elapsed
                    };
                    let run = RunResult::success(
                        configuration.alpha,
                        seed,
                        configuration.description.clone(),
                        max_steps,
                        outcome.final_eval_loss,
                        outcome.final_train_loss,
                        duration,
                    );
                    info!(
                        alpha = configuration.alpha,
                        seed,
                        eval_loss = outcome.final_eval_loss,
                        train_loss = outcome.final_train_loss,
                        duration_secs = duration,
                        "run completed"
                    );
                    return run;
                }
                Err(reason) => reason,
            },
            Ok(Err(err)) => err.reason().to_string(),
            Err(payload) => format!("trainer panicked: {}", panic_message(payload.as_ref())),
        };

        warn!(
            alpha = configuration.alpha,
            seed,
            error = %failure,
            "run failed"
        );
        RunResult::failed(
            configuration.alpha,
            seed,
            configuration.description.clone(),
            max_steps,
            failure,
        )
    }
}

fn check_outcome(outcome: &TrainOutcome) -> Result<(), String> {
    if !outcome.final_eval_loss.is_finite() {
        return Err(format!("non-finite eval loss {}", outcome.final_eval_loss));
    }
    if !outcome.final_train_loss.is_finite() {
        return Err(format!("non-finite train loss {}", outcome.final_train_loss));
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
