//! Sweep Demo: Gated Activation Matrix with Synthetic Training
//!
//! Runs the five-point alpha grid over three seeds against a synthetic
//! trainer whose loss curve improves with moderate gating, then profiles a
//! toy gated-activation model and prints the report.
//!
//! One run (alpha=0.7, seed=456) is rigged to fail so the report shows
//! failure containment. Re-running the demo resumes from the snapshot and
//! does no training at all.
//!
//! Run with: cargo run --example sweep_demo [output_dir]
//! Verbose:  SWEEPSTAT_LOG=sweepstat=debug cargo run --example sweep_demo

use std::path::PathBuf;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sweepstat::collaborator::{
    CollaboratorError, EfficiencyHarness, ModelHandle, TrainOutcome, TrainRequest, Trainer,
    TrainerCapabilities,
};
use sweepstat::store::JsonFileStore;
use sweepstat::telemetry::init_tracing;
use sweepstat::{Orchestrator, SweepPlan};

/// Loss model: quadratic in alpha with its minimum near 0.4, plus seed noise.
struct SyntheticTrainer;

impl Trainer for SyntheticTrainer {
    fn run(&self, request: &TrainRequest) -> Result<TrainOutcome, CollaboratorError> {
        if request.alpha == 0.7 && request.seed == 456 {
            return Err(CollaboratorError::new(
                "CUDA error: an illegal memory access was encountered",
            ));
        }

        let mut rng = StdRng::seed_from_u64(request.seed ^ request.alpha.to_bits());
        #[allow(clippy::cast_precision_loss)]
        let budget = (request.max_steps as f64).ln_1p() / 10.0;
        let base = 3.4 - budget + 0.6 * (request.alpha - 0.4).powi(2);
        let eval = base + rng.gen_range(-0.03..0.03);
        let train = eval - 0.15 + rng.gen_range(-0.02..0.02);

        Ok(TrainOutcome {
            final_eval_loss: eval,
            final_train_loss: train,
            duration_secs: 0.0,
        })
    }

    fn capabilities(&self) -> TrainerCapabilities {
        TrainerCapabilities {
            activation_injection: true,
        }
    }
}

/// Single hidden layer with `x * (alpha * sigmoid(x) + (1 - alpha))` activation.
struct ToyModel {
    alpha: f32,
    weights: Vec<f32>,
}

impl ModelHandle for ToyModel {
    fn forward(&self, input: &[u32]) -> Result<Vec<f32>, CollaboratorError> {
        let width = self.weights.len();
        Ok(input
            .iter()
            .map(|&token| {
                let index = token as usize % width;
                let x = self.weights[index];
                let gate = self.alpha / (1.0 + (-x).exp()) + (1.0 - self.alpha);
                self.weights
                    .iter()
                    .map(|w| (x * gate * w).tanh())
                    .sum::<f32>()
            })
            .collect())
    }

    fn parameter_count(&self) -> u64 {
        self.weights.len() as u64
    }
}

struct ToyHarness;

impl EfficiencyHarness for ToyHarness {
    fn backend(&self) -> &str {
        "cpu"
    }

    fn load(&mut self, alpha: f64) -> Result<Box<dyn ModelHandle>, CollaboratorError> {
        let mut rng = StdRng::seed_from_u64(7);
        #[allow(clippy::cast_possible_truncation)]
        Ok(Box::new(ToyModel {
            alpha: alpha as f32,
            weights: (0..4096).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }))
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let output_dir = std::env::args()
        .nth(1)
        .map_or_else(|| std::env::temp_dir().join("sweepstat_demo"), PathBuf::from);
    let store = JsonFileStore::in_dir(&output_dir);
    println!("=== Sweepstat Demo ===");
    println!("Snapshot: {}\n", store.path().display());

    let plan = SweepPlan::paper_default()
        .with_max_steps(500)
        .with_profiling(3, 20);

    let mut sweep = Orchestrator::builder(plan, SyntheticTrainer, store)
        .backend("cpu")
        .resume(true)
        .build()
        .context("failed to set up sweep")?;

    let report = sweep
        .run_all(&mut ToyHarness)
        .context("sweep aborted")?;

    println!("{report}\n");

    println!("Efficiency:");
    for (key, measurement) in sweep.record().efficiency_results() {
        println!(
            "  {key}: {:.3} ± {:.3} ms, {} params",
            measurement.avg_inference_time_ms,
            measurement.std_inference_time_ms,
            measurement.parameters
        );
    }

    println!(
        "\n{} of {} runs failed and were recorded without stopping the sweep",
        report.failed_runs(),
        report.attempted_runs()
    );
    Ok(())
}
