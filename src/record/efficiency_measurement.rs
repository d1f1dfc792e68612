//! Efficiency Measurement - inference timing for one configuration

use serde::{Deserialize, Serialize};

/// Inference timing, memory and size of one configuration's model.
///
/// `memory_mb` is `None` when the backend cannot report peak memory; it is
/// persisted as JSON `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EfficiencyMeasurement {
    /// Configuration alpha.
    pub alpha: f64,
    /// Mean forward-pass time over the timed iterations.
    pub avg_inference_time_ms: f64,
    /// Population standard deviation of forward-pass time.
    pub std_inference_time_ms: f64,
    /// Peak backend memory, if the backend reports it.
    pub memory_mb: Option<f64>,
    /// Static parameter count of the model instance.
    pub parameters: u64,
    /// Discarded warmup passes.
    pub warmup_iters: usize,
    /// Timed passes.
    pub timed_iters: usize,
}
