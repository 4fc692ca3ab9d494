//! Scan orchestration
//!
//! Coordinates one scan:
//! - Session lifecycle (open once, close exactly once)
//! - Probe execution in canonical order with per-probe isolation
//! - Optional concurrent execution of read-only probes
//! - Aggregation into a `ScanResult`

pub mod aggregator;
pub mod progress;
pub mod store;
pub mod types;

pub use aggregator::aggregate;
pub use progress::{NoOpProgress, ScanProgress, TracingProgress};
pub use store::{JsonFileStore, ScanResultStore};
pub use types::{ScanRequest, ScanRequestError, ScanResult, ScanStatus};

use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::probes::{PageAccess, ProbeDependencies, ProbeName, ProbeRegistry, ProbeResult};
use crate::scan_session::{BrowserLauncher, ChromeLauncher, ScanSession, run_bounded};

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs scans. Holds no per-scan state; one orchestrator can serve
/// concurrent `run_scan` calls, each with its own browser.
#[derive(Clone)]
pub struct ScanOrchestrator {
    config: ScanConfig,
    launcher: Arc<dyn BrowserLauncher>,
    registry: ProbeRegistry,
    progress: Arc<dyn ScanProgress>,
}

impl std::fmt::Debug for ScanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ScanOrchestrator {
    /// Local Chrome plus the six standard probes
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        let registry = ProbeRegistry::standard(&config, ProbeDependencies::from_config(&config));
        Self::with_parts(config, Arc::new(ChromeLauncher), registry)
    }

    #[must_use]
    pub fn with_parts(
        config: ScanConfig,
        launcher: Arc<dyn BrowserLauncher>,
        registry: ProbeRegistry,
    ) -> Self {
        Self {
            config,
            launcher,
            registry,
            progress: Arc::new(NoOpProgress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ScanProgress>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// Run every requested probe against one fresh session.
    ///
    /// Never fails: session errors produce a `Failed` result with no probe
    /// entries, probe errors, timeouts and panics become
    /// `ProbeResult::Failed` for that probe only.
    pub async fn run_scan(&self, request: &ScanRequest) -> ScanResult {
        let scan_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let url = request.url();

        self.progress.scan_started(&scan_id.to_string(), url);
        info!(
            target: "sitescan::orchestrator",
            "Scan {scan_id} of {url} with probes {:?}",
            request.probes()
        );

        let mut session = match ScanSession::open(self.launcher.as_ref(), &self.config, url).await {
            Ok(session) => session,
            Err(e) => {
                let message = e.to_string();
                error!(target: "sitescan::orchestrator", "Scan {scan_id} aborted: {message}");
                self.progress.session_failed(url, &message);
                let result = ScanResult::session_failed(scan_id, url, started_at, message);
                self.progress.scan_finished(&result);
                return result;
            }
        };
        self.progress.session_opened(url);

        let outcomes = self.run_probes(request, &session).await;

        session.close().await;
        self.progress.session_closed(url);

        let mut per_probe = BTreeMap::new();
        let mut durations_ms = BTreeMap::new();
        for (name, result, elapsed) in outcomes {
            durations_ms.insert(name, u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
            per_probe.insert(name, result);
        }

        let (overall_score, status) = aggregate(&per_probe);
        let result = ScanResult {
            scan_id,
            url: url.to_string(),
            per_probe,
            overall_score,
            status,
            durations_ms,
            started_at,
            finished_at: chrono::Utc::now(),
            error: None,
        };

        info!(
            target: "sitescan::orchestrator",
            "Scan {scan_id} finished: {:?}, overall {:?}, failed probes {:?}",
            result.status,
            result.overall_score,
            result.failed_probes()
        );
        self.progress.scan_finished(&result);
        result
    }

    async fn run_probes(
        &self,
        request: &ScanRequest,
        session: &ScanSession,
    ) -> Vec<(ProbeName, ProbeResult, Duration)> {
        let url = request.url();
        let mut outcomes = Vec::with_capacity(request.probes().len());

        if !self.config.concurrent_read_only_probes() {
            for name in request.probes() {
                outcomes.push(self.run_probe(*name, session, url).await);
            }
            return outcomes;
        }

        // Exclusive (and unregistered) probes first, one at a time, then the
        // rest together. Nothing navigates once the sequential phase ends.
        let (sequential, shared): (Vec<ProbeName>, Vec<ProbeName>) =
            request.probes().iter().copied().partition(|name| {
                self.registry
                    .get(*name)
                    .is_none_or(|probe| probe.access() == PageAccess::Exclusive)
            });

        for name in sequential {
            outcomes.push(self.run_probe(name, session, url).await);
        }

        debug!(target: "sitescan::orchestrator", "Running {shared:?} concurrently");
        outcomes.extend(join_all(shared.into_iter().map(|name| self.run_probe(name, session, url))).await);
        outcomes
    }

    async fn run_probe(
        &self,
        name: ProbeName,
        session: &ScanSession,
        url: &str,
    ) -> (ProbeName, ProbeResult, Duration) {
        self.progress.probe_started(name);
        let started = Instant::now();

        let result = match self.registry.get(name) {
            None => {
                warn!(target: "sitescan::orchestrator", "No probe registered for {name}");
                ProbeResult::failed(format!("No probe registered for {name}"))
            }
            Some(probe) => {
                let limit = Duration::from_secs(probe.timeout_secs());
                let guarded = async move {
                    match AssertUnwindSafe(probe.run(session, url)).catch_unwind().await {
                        Ok(outcome) => outcome,
                        Err(payload) => Err(anyhow::anyhow!(
                            "{name} probe panicked: {}",
                            panic_message(payload.as_ref())
                        )),
                    }
                };

                match run_bounded(&format!("{name} probe"), limit, guarded).await {
                    Ok(report) => ProbeResult::Completed(report),
                    Err(e) => {
                        let message = format!("{e:#}");
                        warn!(target: "sitescan::orchestrator", "{name} probe failed: {message}");
                        ProbeResult::failed(message)
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        debug!(
            target: "sitescan::orchestrator",
            "{name} finished in {}ms",
            elapsed.as_millis()
        );
        self.progress.probe_finished(name, &result, elapsed);
        (name, result, elapsed)
    }
}
