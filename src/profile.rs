//! Efficiency profiling
//!
//! Times repeated forward passes of an inference-only model:
//!
//! 1. load the model for the configuration's alpha
//! 2. run `warmup_iters` passes and discard them (first-call initialization)
//! 3. run `timed_iters` passes, timing each with [`Instant`]
//!
//! Every pass must produce the same output bits as the first one; a model
//! that changes its output between passes is rejected because its timings
//! would not be measuring inference alone.

use std::time::Instant;

use tracing::{debug, info};

use crate::aggregate::mean_std;
use crate::collaborator::{EfficiencyHarness, ModelHandle};
use crate::plan::ExperimentConfiguration;
use crate::record::EfficiencyMeasurement;
use crate::{Error, Result};

/// Profiles model instances built by an [`EfficiencyHarness`].
pub struct EfficiencyProfiler<'a, H: EfficiencyHarness> {
    harness: &'a mut H,
}

impl<'a, H: EfficiencyHarness> EfficiencyProfiler<'a, H> {
    /// Wrap a harness.
    #[must_use]
    pub fn new(harness: &'a mut H) -> Self {
        Self { harness }
    }

    /// Profile one configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profiling`] if the model cannot be loaded, a forward
    /// pass fails, or the output is not deterministic
    pub fn profile(
        &mut self,
        configuration: &ExperimentConfiguration,
        input: &[u32],
        warmup_iters: usize,
        timed_iters: usize,
    ) -> Result<EfficiencyMeasurement> {
        let alpha = configuration.alpha;
        let fail = |reason: String| Error::Profiling { alpha, reason };

        self.harness.reset_peak_memory();
        let model = self
            .harness
            .load(alpha)
            .map_err(|e| fail(format!("load failed: {e}")))?;

        let mut reference: Option<Vec<u32>> = None;
        for _ in 0..warmup_iters {
            let output = forward(model.as_ref(), input).map_err(&fail)?;
            check_deterministic(&mut reference, &output).map_err(&fail)?;
        }
        debug!(alpha, warmup_iters, "warmup finished");

        let mut times_ms = Vec::with_capacity(timed_iters);
        for _ in 0..timed_iters {
            let started = Instant::now();
            let output = forward(model.as_ref(), input).map_err(&fail)?;
            times_ms.push(started.elapsed().as_secs_f64() * 1000.0);
            check_deterministic(&mut reference, &output).map_err(&fail)?;
        }

        let stats = mean_std(&times_ms)
            .ok_or_else(|| fail("no timed iterations".to_string()))?;
        let measurement = EfficiencyMeasurement {
            alpha,
            avg_inference_time_ms: stats.mean,
            std_inference_time_ms: stats.std,
            memory_mb: self.harness.peak_memory_mb(),
            parameters: model.parameter_count(),
            warmup_iters,
            timed_iters,
        };
        info!(
            alpha,
            backend = self.harness.backend(),
            avg_ms = measurement.avg_inference_time_ms,
            std_ms = measurement.std_inference_time_ms,
            parameters = measurement.parameters,
            "profiled configuration"
        );
        Ok(measurement)
    }
}

fn forward(model: &dyn ModelHandle, input: &[u32]) -> std::result::Result<Vec<f32>, String> {
    model
        .forward(input)
        .map_err(|e| format!("forward failed: {e}"))
}

fn check_deterministic(
    reference: &mut Option<Vec<u32>>,
    output: &[f32],
) -> std::result::Result<(), String> {
    let bits: Vec<u32> = output.iter().map(|v| v.to_bits()).collect();
    match reference {
        None => {
            *reference = Some(bits);
            Ok(())
        }
        Some(expected) if *expected == bits => Ok(()),
        Some(_) => Err("forward output changed between passes".to_string()),
    }
}
