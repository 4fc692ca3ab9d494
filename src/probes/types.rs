//! Probe names, findings and outcomes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The fixed set of analysis probes.
///
/// Variant order is the canonical execution order; `Ord` follows it, so
/// `BTreeSet<ProbeName>` and `BTreeMap<ProbeName, _>` iterate canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeName {
    Performance,
    Seo,
    Security,
    Accessibility,
    Uptime,
    AiInsight,
}

impl ProbeName {
    /// All probes in canonical order
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Performance,
            Self::Seo,
            Self::Security,
            Self::Accessibility,
            Self::Uptime,
            Self::AiInsight,
        ]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Seo => "seo",
            Self::Security => "security",
            Self::Accessibility => "accessibility",
            Self::Uptime => "uptime",
            Self::AiInsight => "ai_insight",
        }
    }
}

impl fmt::Display for ProbeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .into_iter()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| s.to_string())
    }
}

/// Severity scale used by SEO, security, performance and insight findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Severity matching a score deduction: 15+ high, 10+ medium, else low
    #[must_use]
    pub const fn from_deduction(points: u32) -> Self {
        if points >= 15 {
            Self::High
        } else if points >= 10 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Impact scale reported by the accessibility audit engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
    #[serde(other)]
    Unknown,
}

impl Impact {
    #[must_use]
    pub const fn priority(self) -> Priority {
        match self {
            Self::Critical | Self::Serious => Priority::High,
            Self::Moderate | Self::Unknown => Priority::Medium,
            Self::Minor => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Either scale, kept apart so the two vocabularies are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueLevel {
    Severity(Severity),
    Impact(Impact),
}

/// One structured finding emitted by a probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub level: IssueLevel,
    pub description: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag_guideline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl Issue {
    #[must_use]
    pub fn new(
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            level: IssueLevel::Severity(severity),
            description: description.into(),
            recommendation: recommendation.into(),
            wcag_guideline: None,
            priority: None,
            rule_id: None,
        }
    }

    /// Accessibility finding; priority derives from impact.
    #[must_use]
    pub fn accessibility(
        impact: Impact,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            level: IssueLevel::Impact(impact),
            description: description.into(),
            recommendation: recommendation.into(),
            wcag_guideline: None,
            priority: Some(impact.priority()),
            rule_id: None,
        }
    }

    #[must_use]
    pub fn with_wcag(mut self, guideline: impl Into<String>) -> Self {
        self.wcag_guideline = Some(guideline.into());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        match self.level {
            IssueLevel::Severity(severity) => Some(severity),
            IssueLevel::Impact(_) => None,
        }
    }

    #[must_use]
    pub fn impact(&self) -> Option<Impact> {
        match self.level {
            IssueLevel::Impact(impact) => Some(impact),
            IssueLevel::Severity(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for MetricValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for MetricValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u16> for MetricValue {
    fn from(value: u16) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u8> for MetricValue {
    fn from(value: u8) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for MetricValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Raw measurements carried alongside a score for display
pub type RawMetrics = BTreeMap<String, MetricValue>;

/// Successful probe output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    /// Always within 0..=100
    pub score: u8,
    pub issues: Vec<Issue>,
    pub raw_metrics: RawMetrics,
}

impl ProbeReport {
    #[must_use]
    pub fn new(score: u8, issues: Vec<Issue>) -> Self {
        Self {
            score: score.min(100),
            issues,
            raw_metrics: RawMetrics::new(),
        }
    }

    /// Record one raw metric
    #[must_use]
    pub fn metric(mut self, key: &str, value: impl Into<MetricValue>) -> Self {
        self.raw_metrics.insert(key.to_string(), value.into());
        self
    }
}

/// Per-probe outcome: a score or an error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeResult {
    Completed(ProbeReport),
    Failed { message: String },
}

impl ProbeResult {
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn score(&self) -> Option<u8> {
        match self {
            Self::Completed(report) => Some(report.score),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&ProbeReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { message } => Some(message),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
