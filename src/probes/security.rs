//! Security probe
//!
//! Re-navigates with network capture to read the main document's response
//! headers and TLS details, waits for the page to settle again, then scans
//! the DOM for mixed content.
//!
//! Inspection failures do not surface as probe errors: they produce a
//! score of 0 with one synthetic high-severity issue.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tracing::{info, warn};

use super::scoring::DeductionLedger;
use super::types::{Issue, ProbeName, ProbeReport, Severity};
use super::{PageAccess, Probe};
use crate::config::ScanConfig;
use crate::page_extractor::extract_mixed_content;
use crate::page_extractor::schema::MixedContentItem;
use crate::scan_session::{CertificateDetails, DocumentResponse, PageHandle, ScanSession, settle};
use crate::utils::SECURITY_HEADERS;

const UNVERIFIABLE_CERT_POINTS: u32 = 30;
const MIXED_CONTENT_POINTS: u32 = 15;

/// TLS certificate verdict for the main document
#[derive(Debug, Clone, PartialEq)]
pub enum CertificateStatus {
    Valid {
        issuer: String,
        valid_to: DateTime<Utc>,
        days_remaining: i64,
    },
    Unverifiable {
        reason: String,
    },
}

impl CertificateStatus {
    #[must_use]
    pub fn evaluate(certificate: Option<&CertificateDetails>, now: DateTime<Utc>) -> Self {
        let Some(cert) = certificate else {
            return Self::Unverifiable {
                reason: "No TLS certificate was presented".to_string(),
            };
        };

        if cert.valid_to <= now {
            return Self::Unverifiable {
                reason: format!("Certificate expired on {}", cert.valid_to.format("%Y-%m-%d")),
            };
        }

        if cert.valid_from > now {
            return Self::Unverifiable {
                reason: format!(
                    "Certificate is not valid before {}",
                    cert.valid_from.format("%Y-%m-%d")
                ),
            };
        }

        Self::Valid {
            issuer: cert.issuer.clone(),
            valid_to: cert.valid_to,
            days_remaining: (cert.valid_to - now).num_days(),
        }
    }
}

/// Everything the security score is computed from
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityInspection {
    pub present_headers: Vec<String>,
    pub missing_headers: Vec<(String, u32)>,
    pub certificate: CertificateStatus,
    pub mixed_content: Vec<MixedContentItem>,
}

impl SecurityInspection {
    #[must_use]
    pub fn from_response(
        response: &DocumentResponse,
        mixed_content: Vec<MixedContentItem>,
        now: DateTime<Utc>,
    ) -> Self {
        let (present, missing): (Vec<_>, Vec<_>) = SECURITY_HEADERS
            .iter()
            .partition(|(name, _)| response.header(name).is_some_and(|v| !v.trim().is_empty()));

        Self {
            present_headers: present.into_iter().map(|(n, _)| (*n).to_string()).collect(),
            missing_headers: missing
                .into_iter()
                .map(|(n, points)| ((*n).to_string(), points))
                .collect(),
            certificate: CertificateStatus::evaluate(response.certificate.as_ref(), now),
            mixed_content,
        }
    }
}

/// Score an inspection. `expiry_warning_days` controls the expiring-soon
/// warning, which never deducts points.
#[must_use]
pub fn calculate_security_score(
    inspection: &SecurityInspection,
    expiry_warning_days: i64,
) -> (u8, Vec<Issue>) {
    let mut ledger = DeductionLedger::new();

    for (header, points) in &inspection.missing_headers {
        ledger.deduct(
            *points,
            format!("Missing security header: {header}"),
            format!("Configure the server to send the {header} header"),
        );
    }

    match &inspection.certificate {
        CertificateStatus::Unverifiable { reason } => ledger.deduct(
            UNVERIFIABLE_CERT_POINTS,
            format!("TLS certificate could not be verified: {reason}"),
            "Serve the site over HTTPS with a valid certificate from a trusted authority",
        ),
        CertificateStatus::Valid { days_remaining, valid_to, .. } => {
            if *days_remaining <= expiry_warning_days {
                ledger.note(Issue::new(
                    Severity::High,
                    format!(
                        "TLS certificate expires in {days_remaining} days ({})",
                        valid_to.format("%Y-%m-%d")
                    ),
                    "Renew the certificate or enable automatic renewal",
                ));
            }
        }
    }

    for item in &inspection.mixed_content {
        ledger.deduct_with(
            MIXED_CONTENT_POINTS,
            Severity::High,
            format!("Mixed content: {} loaded over HTTP ({})", item.kind, item.url),
            "Load every sub-resource over HTTPS",
        );
    }

    ledger.finish()
}

/// Report for an inspection that could not be carried out.
#[must_use]
pub fn inspection_failure_report(message: &str) -> ProbeReport {
    ProbeReport::new(
        0,
        vec![Issue::new(
            Severity::High,
            format!("Security inspection failed: {message}"),
            "Make sure the site is reachable over HTTPS and retry the scan",
        )],
    )
    .metric("error", message)
}

pub struct SecurityProbe {
    timeout_secs: u64,
    expiry_warning_days: i64,
}

impl SecurityProbe {
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            timeout_secs: config.probe_timeout_secs(),
            expiry_warning_days: config.cert_expiry_warning_days(),
        }
    }

    async fn inspect(
        &self,
        page: &dyn PageHandle,
        config: &ScanConfig,
        url: &str,
    ) -> Result<(SecurityInspection, String)> {
        let response = page
            .goto_capturing_document(url, config.navigation_timeout())
            .await
            .context("Failed to capture document response")?;
        // later probes read this page's DOM
        settle(page, config)
            .await
            .context("Page did not settle after re-navigation")?;
        let mixed_content = extract_mixed_content(page).await?;

        let protocol = response
            .certificate
            .as_ref()
            .map_or_else(|| "none".to_string(), |c| c.protocol.clone());

        Ok((
            SecurityInspection::from_response(&response, mixed_content, Utc::now()),
            protocol,
        ))
    }
}

impl Probe for SecurityProbe {
    fn name(&self) -> ProbeName {
        ProbeName::Security
    }

    fn access(&self) -> PageAccess {
        PageAccess::Exclusive
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
            let page = session.page()?;
            let (inspection, protocol) = match self.inspect(page, session.config(), url).await {
                Ok(found) => found,
                Err(e) => {
                    let message = format!("{e:#}");
                    warn!(target: "sitescan::probes", "Security inspection of {url} failed: {message}");
                    return Ok(inspection_failure_report(&message));
                }
            };

            let (score, issues) = calculate_security_score(&inspection, self.expiry_warning_days);
            info!(target: "sitescan::probes", "Security for {url}: {score} ({} issues)", issues.len());

            let missing: Vec<&str> = inspection
                .missing_headers
                .iter()
                .map(|(name, _)| name.as_str())
                .collect();

            let mut report = ProbeReport::new(score, issues)
                .metric("presentHeaders", inspection.present_headers.join(","))
                .metric("missingHeaders", missing.join(","))
                .metric("mixedContentCount", inspection.mixed_content.len() as u64)
                .metric("protocol", protocol);

            report = match &inspection.certificate {
                CertificateStatus::Valid {
                    issuer,
                    valid_to,
                    days_remaining,
                } => report
                    .metric("certificateValid", true)
                    .metric("certificateIssuer", issuer.as_str())
                    .metric("certificateValidTo", valid_to.to_rfc3339())
                    .metric("certificateDaysRemaining", *days_remaining),
                CertificateStatus::Unverifiable { .. } => report.metric("certificateValid", false),
            };

            Ok(report)
        })
    }
}
