//! Shared score arithmetic for the probe calculators.

use super::types::{Issue, Severity};

/// Round and clamp to the 0..=100 score range. Non-finite input scores 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Good/average boundaries for a lower-is-better metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub good: f64,
    pub average: f64,
}

impl Thresholds {
    #[must_use]
    pub const fn new(good: f64, average: f64) -> Self {
        Self { good, average }
    }
}

impl From<(f64, f64)> for Thresholds {
    fn from((good, average): (f64, f64)) -> Self {
        Self { good, average }
    }
}

/// Piecewise-linear sub-score:
/// 100 up to `good`, 100 falling to 60 at `average`, then falling to 0
/// at twice `average`.
#[must_use]
pub fn threshold_score(value: f64, thresholds: Thresholds) -> f64 {
    let Thresholds { good, average } = thresholds;
    if value <= good {
        100.0
    } else if value <= average {
        60.0 + 40.0 * (average - value) / (average - good)
    } else {
        (60.0 * (1.0 - (value - average) / average)).max(0.0)
    }
}

/// Accumulates deductions from a 100-point baseline together with the
/// issue each deduction raises.
#[derive(Debug, Clone, Default)]
pub struct DeductionLedger {
    total: u32,
    issues: Vec<Issue>,
}

impl DeductionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deduct `points` and record an issue whose severity matches them.
    pub fn deduct(
        &mut self,
        points: u32,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        self.deduct_with(points, Severity::from_deduction(points), description, recommendation);
    }

    /// Deduct `points` with an explicit severity.
    pub fn deduct_with(
        &mut self,
        points: u32,
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        self.total = self.total.saturating_add(points);
        self.issues
            .push(Issue::new(severity, description, recommendation));
    }

    /// Record an issue without changing the score.
    pub fn note(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    #[must_use]
    pub fn total_deducted(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> u8 {
        clamp_score(100.0 - f64::from(self.total))
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn finish(self) -> (u8, Vec<Issue>) {
        (self.score(), self.issues)
    }
}
