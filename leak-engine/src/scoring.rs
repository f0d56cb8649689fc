//! Severity and confidence scoring.
//!
//! Both are pure functions of already computed scalars. Neither looks at which
//! signal is being scored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::thresholds::*;

/// Coarse loss bucket relative to window revenue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || denominator.is_nan() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Round to cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classify a loss against window revenue. High is checked before medium.
pub fn severity(loss: f64, revenue_window: f64) -> Severity {
    let ratio = safe_div(loss, revenue_window.max(1.0));
    if ratio >= SEVERITY_HIGH_RATIO || loss >= SEVERITY_HIGH_LOSS {
        Severity::High
    } else if ratio >= SEVERITY_MEDIUM_RATIO || loss >= SEVERITY_MEDIUM_LOSS {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Trust score from the number of contributing rows, in `[0.1, 1.0]`,
/// rounded to two decimals.
pub fn confidence(sample_size: usize, completeness: f64) -> f64 {
    let sample_score =
        (safe_div(sample_size as f64, CONFIDENCE_SAMPLE_SCALE) + CONFIDENCE_SAMPLE_FLOOR).min(1.0);
    let raw = CONFIDENCE_COMPLETENESS_WEIGHT * completeness + CONFIDENCE_SAMPLE_WEIGHT * sample_score;
    round_cents(raw.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX))
}
