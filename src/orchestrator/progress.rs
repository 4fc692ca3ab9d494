//! Progress reporting for scans
//!
//! Defines the `ScanProgress` trait for lifecycle event reporting and
//! provides a no-op and a tracing-backed implementation.

use std::time::Duration;
use tracing::{info, warn};

use crate::probes::{ProbeName, ProbeResult};

use super::types::ScanResult;

/// Lifecycle hooks called by the orchestrator.
///
/// Implementations can forward updates to channels, logs or a UI. Hooks
/// must not block; they run on the scan task.
pub trait ScanProgress: Send + Sync {
    fn scan_started(&self, scan_id: &str, url: &str);

    fn session_opened(&self, url: &str);

    fn session_failed(&self, url: &str, error: &str);

    fn probe_started(&self, probe: ProbeName);

    fn probe_finished(&self, probe: ProbeName, result: &ProbeResult, elapsed: Duration);

    fn session_closed(&self, url: &str);

    fn scan_finished(&self, result: &ScanResult);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ScanProgress for NoOpProgress {
    #[inline(always)]
    fn scan_started(&self, _scan_id: &str, _url: &str) {}

    #[inline(always)]
    fn session_opened(&self, _url: &str) {}

    #[inline(always)]
    fn session_failed(&self, _url: &str, _error: &str) {}

    #[inline(always)]
    fn probe_started(&self, _probe: ProbeName) {}

    #[inline(always)]
    fn probe_finished(&self, _probe: ProbeName, _result: &ProbeResult, _elapsed: Duration) {}

    #[inline(always)]
    fn session_closed(&self, _url: &str) {}

    #[inline(always)]
    fn scan_finished(&self, _result: &ScanResult) {}
}

/// Logs every lifecycle step under the `sitescan::progress` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ScanProgress for TracingProgress {
    fn scan_started(&self, scan_id: &str, url: &str) {
        info!(target: "sitescan::progress", "Scan {scan_id} started for {url}");
    }

    fn session_opened(&self, url: &str) {
        info!(target: "sitescan::progress", "Session open on {url}");
    }

    fn session_failed(&self, url: &str, error: &str) {
        warn!(target: "sitescan::progress", "Session for {url} failed: {error}");
    }

    fn probe_started(&self, probe: ProbeName) {
        info!(target: "sitescan::progress", "Running {probe}");
    }

    fn probe_finished(&self, probe: ProbeName, result: &ProbeResult, elapsed: Duration) {
        match result {
            ProbeResult::Completed(report) => info!(
                target: "sitescan::progress",
                "{probe} scored {} in {}ms",
                report.score,
                elapsed.as_millis()
            ),
            ProbeResult::Failed { message } => warn!(
                target: "sitescan::progress",
                "{probe} failed after {}ms: {message}",
                elapsed.as_millis()
            ),
        }
    }

    fn session_closed(&self, url: &str) {
        info!(target: "sitescan::progress", "Session closed for {url}");
    }

    fn scan_finished(&self, result: &ScanResult) {
        info!(
            target: "sitescan::progress",
            "Scan {} finished: {:?}, overall {:?}",
            result.scan_id,
            result.status,
            result.overall_score
        );
    }
}
