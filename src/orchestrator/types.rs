//! Scan request and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::probes::{ProbeName, ProbeResult};
use crate::utils::is_valid_url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanRequestError {
    #[error("At least one probe must be requested")]
    EmptyProbeSet,

    #[error("Invalid URL (expected http or https): {0}")]
    InvalidUrl(String),

    #[error("Unknown probe: {0}")]
    UnknownProbe(String),
}

/// What to scan. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    url: String,
    probes: BTreeSet<ProbeName>,
}

impl ScanRequest {
    /// # Errors
    ///
    /// `EmptyProbeSet` for an empty probe set, `InvalidUrl` for anything
    /// that is not an absolute http(s) URL.
    pub fn new(
        url: impl Into<String>,
        probes: impl IntoIterator<Item = ProbeName>,
    ) -> Result<Self, ScanRequestError> {
        let url = url.into();
        if !is_valid_url(&url) {
            return Err(ScanRequestError::InvalidUrl(url));
        }

        let probes: BTreeSet<ProbeName> = probes.into_iter().collect();
        if probes.is_empty() {
            return Err(ScanRequestError::EmptyProbeSet);
        }

        Ok(Self { url, probes })
    }

    /// Request for every probe
    ///
    /// # Errors
    ///
    /// `InvalidUrl` as for [`ScanRequest::new`].
    pub fn all_probes(url: impl Into<String>) -> Result<Self, ScanRequestError> {
        Self::new(url, ProbeName::all())
    }

    /// Parse probe names such as `"seo"` or `"ai_insight"`.
    ///
    /// # Errors
    ///
    /// `UnknownProbe` naming the first name that does not parse.
    pub fn parse_probes<'a>(
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<BTreeSet<ProbeName>, ScanRequestError> {
        names
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| {
                name.parse::<ProbeName>()
                    .map_err(ScanRequestError::UnknownProbe)
            })
            .collect()
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requested probes in canonical order
    #[must_use]
    pub fn probes(&self) -> &BTreeSet<ProbeName> {
        &self.probes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Completed,
    Failed,
}

/// Outcome of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub url: String,
    pub per_probe: BTreeMap<ProbeName, ProbeResult>,
    /// Rounded mean of completed probe scores; `None` when none completed
    pub overall_score: Option<u8>,
    pub status: ScanStatus,
    /// Wall-clock time per probe; observability only
    pub durations_ms: BTreeMap<ProbeName, u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Session-level failure that prevented any probe from running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    /// Result for a scan whose session could not be opened
    #[must_use]
    pub fn session_failed(
        scan_id: Uuid,
        url: impl Into<String>,
        started_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            scan_id,
            url: url.into(),
            per_probe: BTreeMap::new(),
            overall_score: None,
            status: ScanStatus::Failed,
            durations_ms: BTreeMap::new(),
            started_at,
            finished_at: Utc::now(),
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn probe(&self, name: ProbeName) -> Option<&ProbeResult> {
        self.per_probe.get(&name)
    }

    /// Names of probes that failed, in canonical order
    #[must_use]
    pub fn failed_probes(&self) -> Vec<ProbeName> {
        self.per_probe
            .iter()
            .filter(|(_, result)| !result.is_completed())
            .map(|(name, _)| *name)
            .collect()
    }
}
