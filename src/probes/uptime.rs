//! Uptime probe
//!
//! One HTTP GET outside the browser. A failed request is the measurement,
//! not a probe error: this probe always reports a score.

use anyhow::Result;
use futures::future::BoxFuture;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::types::{Issue, ProbeName, ProbeReport, Severity};
use super::{PageAccess, Probe};
use crate::config::ScanConfig;
use crate::scan_session::ScanSession;
use crate::utils::CHROME_USER_AGENT;

/// `[200, 400)` counts as available.
#[must_use]
pub fn is_available(status: u16) -> bool {
    (200..400).contains(&status)
}

/// GET `url` once and report availability, latency and status.
pub async fn check_uptime(client: &reqwest::Client, url: &str, timeout: Duration) -> ProbeReport {
    let started = Instant::now();
    let outcome = client
        .get(url)
        .header(reqwest::header::USER_AGENT, CHROME_USER_AGENT)
        .timeout(timeout)
        .send()
        .await;
    #[allow(clippy::cast_precision_loss)]
    let response_time = started.elapsed().as_millis() as f64;

    match outcome {
        Ok(response) => {
            let status = response.status().as_u16();
            let available = is_available(status);
            info!(
                target: "sitescan::probes",
                "Uptime for {url}: HTTP {status} in {response_time:.0}ms"
            );

            let issues = if available {
                Vec::new()
            } else {
                vec![Issue::new(
                    Severity::High,
                    format!("Site responded with HTTP {status}"),
                    "Check the server and application logs for the failing response",
                )]
            };

            ProbeReport::new(if available { 100 } else { 0 }, issues)
                .metric("availability", if available { 100u8 } else { 0 })
                .metric("responseTime", response_time)
                .metric("statusCode", status)
                .metric("finalUrl", response.url().as_str())
        }
        Err(e) => {
            let message = if e.is_timeout() {
                format!("Request timed out after {}s", timeout.as_secs())
            } else {
                format!("{e:#}")
            };
            warn!(target: "sitescan::probes", "Uptime check for {url} failed: {message}");

            ProbeReport::new(
                0,
                vec![Issue::new(
                    Severity::High,
                    format!("Site is unreachable: {message}"),
                    "Verify DNS, TLS and that the server is accepting connections",
                )],
            )
            .metric("availability", 0u8)
            .metric("responseTime", response_time)
            .metric("statusCode", 0u16)
            .metric("error", message)
        }
    }
}

pub struct UptimeProbe {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl UptimeProbe {
    #[must_use]
    pub fn new(config: &ScanConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            timeout_secs: config.uptime_timeout_secs(),
        }
    }
}

impl Probe for UptimeProbe {
    fn name(&self) -> ProbeName {
        ProbeName::Uptime
    }

    fn access(&self) -> PageAccess {
        PageAccess::Detached
    }

    /// Slightly above the request timeout so the request's own timeout
    /// fires first and is reported as a measurement.
    fn timeout_secs(&self) -> u64 {
        self.timeout_secs + 5
    }

    fn run<'a>(
        &'a self,
        _session: &'a ScanSession,
        url: &'a str,
    ) -> BoxFuture<'a, Result<ProbeReport>> {
        Box::pin(async move {
            Ok(check_uptime(&self.client, url, Duration::from_secs(self.timeout_secs)).await)
        })
    }
}
