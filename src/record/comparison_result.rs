//! Comparison Result - treatment vs baseline effect size

use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualitative bucket of |Cohen's d|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectSize {
    /// |d| < 0.2
    Negligible,
    /// 0.2 <= |d| < 0.5
    Small,
    /// 0.5 <= |d| < 0.8
    Medium,
    /// |d| >= 0.8
    Large,
}

impl EffectSize {
    /// Classify a Cohen's d value. Boundaries belong to the upper bucket.
    #[must_use]
    pub fn from_cohens_d(d: f64) -> Self {
        let magnitude = d.abs();
        if magnitude < 0.2 {
            Self::Negligible
        } else if magnitude < 0.5 {
            Self::Small
        } else if magnitude < 0.8 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    /// Lowercase label as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison of one treatment configuration against the baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    /// Treatment alpha.
    pub alpha: f64,
    /// Baseline alpha (always 0.0).
    pub baseline_alpha: f64,
    /// Baseline mean evaluation loss.
    pub baseline_loss: f64,
    /// Treatment mean evaluation loss.
    pub treatment_loss: f64,
    /// Baseline evaluation loss standard deviation.
    pub baseline_std: f64,
    /// Treatment evaluation loss standard deviation.
    pub treatment_std: f64,
    /// Pooled standard deviation used as the d denominator.
    pub pooled_std: f64,
    /// Relative loss reduction in percent; positive means better than baseline.
    pub improvement_pct: f64,
    /// Standardized mean difference.
    pub cohens_d: f64,
    /// Bucket of |cohens_d|.
    pub effect_size: EffectSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_size_boundaries() {
        assert_eq!(EffectSize::from_cohens_d(0.19), EffectSize::Negligible);
        assert_eq!(EffectSize::from_cohens_d(0.2), EffectSize::Small);
        assert_eq!(EffectSize::from_cohens_d(0.5), EffectSize::Medium);
        assert_eq!(EffectSize::from_cohens_d(0.8), EffectSize::Large);
    }

    #[test]
    fn test_effect_size_uses_magnitude() {
        assert_eq!(EffectSize::from_cohens_d(-0.6), EffectSize::Medium);
        assert_eq!(EffectSize::from_cohens_d(-3.0), EffectSize::Large);
    }

    #[test]
    fn test_effect_size_serializes_lowercase() {
        let json = serde_json::to_string(&EffectSize::Negligible).unwrap();
        assert_eq!(json, "\"negligible\"");
        assert_eq!(EffectSize::Medium.to_string(), "medium");
    }
}
