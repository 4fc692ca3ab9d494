//! Accessibility probe
//!
//! Runs the configured `AccessibilityEngine` against the loaded page and
//! scores violations by impact.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::info;

use super::scoring::clamp_score;
use super::types::{Impact, Issue, ProbeName, ProbeReport};
use super::{PageAccess, Probe};
use crate::accessibility::{AccessibilityEngine, AuditReport, RuleResult};
use crate::config::ScanConfig;
use crate::scan_session::ScanSession;

/// Violation tallies by impact. Missing or unrecognized impact counts as minor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpactCounts {
    pub critical: u32,
    pub serious: u32,
    pub moderate: u32,
    pub minor: u32,
}

impl ImpactCounts {
    #[must_use]
    pub fn tally(violations: &[RuleResult]) -> Self {
        violations.iter().fold(Self::default(), |mut counts, v| {
            match v.impact {
                Some(Impact::Critical) => counts.critical += 1,
                Some(Impact::Serious) => counts.serious += 1,
                Some(Impact::Moderate) => counts.moderate += 1,
                Some(Impact::Minor | Impact::Unknown) | None => counts.minor += 1,
            }
            counts
        })
    }

    /// `100 - critical*10 - serious*5 - moderate*3 - minor`, clamped
    #[must_use]
    pub fn score(self) -> u8 {
        let deducted = f64::from(self.critical) * 10.0
            + f64::from(self.serious) * 5.0
            + f64::from(self.moderate) * 3.0
            + f64::from(self.minor);
        clamp_score(100.0 - deducted)
    }
}

fn violation_issue(violation: &RuleResult) -> Issue {
    let impact = violation.impact.unwrap_or(Impact::Minor);
    let description = if violation.description.is_empty() {
        violation.id.clone()
    } else {
        violation.description.clone()
    };
    let mut issue = Issue::accessibility(impact, description, violation.help.clone())
        .with_rule(violation.id.clone());
    if !violation.help_url.is_empty() {
        issue = issue.with_wcag(violation.help_url.clone());
    }
    issue
}

/// Score an audit and map violations to issues.
///
/// Guarantees `issues.is_empty() == (score == 100)`: violations that touch
/// no nodes still count toward the score but are not listed, in which case
/// a placeholder issue stands in for them.
#[must_use]
pub fn calculate_accessibility_score(audit: &AuditReport) -> (u8, Vec<Issue>) {
    let mut score = ImpactCounts::tally(&audit.violations).score();

    let mut issues: Vec<Issue> = audit
        .violations
        .iter()
        .filter(|v| !v.nodes.is_empty())
        .map(violation_issue)
        .collect();

    if score < 100 && issues.is_empty() {
        issues.push(Issue::accessibility(
            Impact::Unknown,
            "Accessibility violations were detected but could not be attributed to page elements",
            "Run a manual accessibility review of the page",
        ));
    }

    if issues.is_empty() {
        score = 100;
    }

    (score, issues)
}

pub struct AccessibilityProbe {
    timeout_secs: u64,
    engine: Arc<dyn AccessibilityEngine>,
}

impl AccessibilityProbe {
    #[must_use]
    pub fn new(config: &ScanConfig, engine: Arc<dyn AccessibilityEngine>) -> Self {
        Self {
            timeout_secs: config.probe_timeout_secs(),
            engine,
        }
    }
}

impl Probe for AccessibilityProbe {
    fn name(&self) -> ProbeName {
        ProbeName::Accessibility
    }

    fn access(&self) -> PageAccess {
        PageAccess::ReadOnly
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn run<'a>(
        &'a self,
        session: &'a ScanSession,
        url: &'a str,
    ) -> BoxFuture<'a, Result<ProbeReport>> {
        Box::pin(async move {
            let audit = self
                .engine
                .analyze(session.page()?)
                .await
                .context("Accessibility audit failed")?;

            let counts = ImpactCounts::tally(&audit.violations);
            let (score, issues) = calculate_accessibility_score(&audit);

            info!(
                target: "sitescan::probes",
                "Accessibility for {url}: {score} ({} violations)",
                audit.violations.len()
            );

            Ok(ProbeReport::new(score, issues)
                .metric("violations", audit.violations.len() as u64)
                .metric("passes", audit.passes.len() as u64)
                .metric("incomplete", audit.incomplete.len() as u64)
                .metric("critical", counts.critical)
                .metric("serious", counts.serious)
                .metric("moderate", counts.moderate)
                .metric("minor", counts.minor))
        })
    }
}
