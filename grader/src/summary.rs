//! Pure score arithmetic: percentage, banding and score formatting.
//!
//! Everything in this module is stateless; the orchestrator calls it once per
//! fresh review and the result is persisted inside the review content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum achievable score for a review.
pub const MAX_SCORE: f64 = 100.0;

/// Round a float to two decimal places in an efficient manner.
///
/// Uses the common multiply / round / divide trick. Kept local to this module
/// so it's cheap to inline and obvious where rounding is happening.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Percentage of `max` achieved by `score`, rounded to two decimals.
pub fn percentage(score: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    round2(score / max * 100.0)
}

/// Qualitative label for a percentage. Boundary values take the higher band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceBand {
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
    Unsatisfactory,
}

impl PerformanceBand {
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 90.0 {
            PerformanceBand::Excellent
        } else if pct >= 80.0 {
            PerformanceBand::Good
        } else if pct >= 70.0 {
            PerformanceBand::Satisfactory
        } else if pct >= 60.0 {
            PerformanceBand::NeedsImprovement
        } else {
            PerformanceBand::Unsatisfactory
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent",
            PerformanceBand::Good => "Good",
            PerformanceBand::Satisfactory => "Satisfactory",
            PerformanceBand::NeedsImprovement => "Needs Improvement",
            PerformanceBand::Unsatisfactory => "Unsatisfactory",
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format an `achieved/max` score string, dropping trailing `.0` so whole
/// numbers read as `"85/100"` rather than `"85.0/100.0"`.
pub fn format_score(achieved: f64, max: f64) -> String {
    fn trim(x: f64) -> String {
        if x.fract() == 0.0 {
            format!("{}", x as i64)
        } else {
            format!("{}", round2(x))
        }
    }
    format!("{}/{}", trim(achieved), trim(max))
}

/// Derived summary persisted alongside a review and echoed in API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// `"achieved/max"` score string.
    pub score: String,
    /// Percentage achieved, rounded to two decimals.
    pub percentage: f64,
    /// Qualitative band label for the percentage.
    pub status: String,
}

/// Build the summary for an achieved score out of `max`.
pub fn summarize(score: f64, max: f64) -> ReviewSummary {
    let pct = percentage(score, max);
    ReviewSummary {
        score: format_score(score, max),
        percentage: pct,
        status: PerformanceBand::from_percentage(pct).as_str().to_string(),
    }
}
