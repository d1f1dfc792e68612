//! Shared mock collaborators for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sweepstat::collaborator::{
    CollaboratorError, EfficiencyHarness, ModelHandle, TrainOutcome, TrainRequest, Trainer,
    TrainerCapabilities,
};

/// Trainer driven by a closure, counting every call.
pub struct FnTrainer<F> {
    f: F,
    calls: Arc<AtomicUsize>,
}

impl<F> FnTrainer<F>
where
    F: Fn(&TrainRequest) -> Result<TrainOutcome, CollaboratorError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the trainer moved into an orchestrator.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl<F> Trainer for FnTrainer<F>
where
    F: Fn(&TrainRequest) -> Result<TrainOutcome, CollaboratorError> + Send + Sync,
{
    fn run(&self, request: &TrainRequest) -> Result<TrainOutcome, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.f)(request)
    }

    fn capabilities(&self) -> TrainerCapabilities {
        TrainerCapabilities {
            activation_injection: true,
        }
    }
}

pub fn outcome(eval: f64, train: f64) -> Result<TrainOutcome, CollaboratorError> {
    Ok(TrainOutcome {
        final_eval_loss: eval,
        final_train_loss: train,
        duration_secs: 1.0,
    })
}

/// Model whose output depends only on the input and alpha.
pub struct GatedModel {
    alpha: f32,
    parameters: u64,
}

impl ModelHandle for GatedModel {
    fn forward(&self, input: &[u32]) -> Result<Vec<f32>, CollaboratorError> {
        Ok(input
            .iter()
            .map(|&t| {
                #[allow(clippy::cast_precision_loss)]
                let x = t as f32 / 1000.0;
                let gate = self.alpha * (1.0 / (1.0 + (-x).exp())) + (1.0 - self.alpha);
                x * gate
            })
            .collect())
    }

    fn parameter_count(&self) -> u64 {
        self.parameters
    }
}

/// Harness with configurable memory reporting and a set of alphas that fail to load.
pub struct MockHarness {
    pub memory_mb: Option<f64>,
    pub failing_alphas: Vec<f64>,
    pub resets: usize,
    pub loads: usize,
}

impl MockHarness {
    pub fn new(memory_mb: Option<f64>) -> Self {
        Self {
            memory_mb,
            failing_alphas: Vec::new(),
            resets: 0,
            loads: 0,
        }
    }
}

impl EfficiencyHarness for MockHarness {
    fn backend(&self) -> &str {
        if self.memory_mb.is_some() {
            "cuda"
        } else {
            "cpu"
        }
    }

    fn load(&mut self, alpha: f64) -> Result<Box<dyn ModelHandle>, CollaboratorError> {
        self.loads += 1;
        if self.failing_alphas.contains(&alpha) {
            return Err(CollaboratorError::new("weights not found"));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Box::new(GatedModel {
            alpha: alpha as f32,
            parameters: 124_439_808,
        }))
    }

    fn peak_memory_mb(&self) -> Option<f64> {
        self.memory_mb
    }

    fn reset_peak_memory(&mut self) {
        self.resets += 1;
    }
}
