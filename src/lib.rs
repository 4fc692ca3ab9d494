pub mod accessibility;
pub mod browser_setup;
pub mod config;
pub mod orchestrator;
pub mod page_extractor;
pub mod probes;
pub mod scan_session;
pub mod text_generation;
pub mod utils;

pub use accessibility::{AccessibilityEngine, AuditReport, AxeCoreEngine, RuleResult};
pub use browser_setup::{
    CHROME_PATH_ENV, download_managed_browser, find_browser_executable, launch_browser,
};
pub use config::{ConfigError, ScanConfig, ScanConfigBuilder};
pub use orchestrator::{
    JsonFileStore, NoOpProgress, ScanOrchestrator, ScanProgress, ScanRequest, ScanRequestError,
    ScanResult, ScanResultStore, ScanStatus, TracingProgress, aggregate,
};
pub use probes::{
    Impact, Issue, IssueLevel, MetricValue, PageAccess, Priority, Probe, ProbeDependencies,
    ProbeName, ProbeRegistry, ProbeReport, ProbeResult, RawMetrics, Severity,
};
pub use scan_session::{
    BrowserHandle, BrowserLauncher, ChromeLauncher, DocumentResponse, PageHandle, ScanSession,
    SessionError,
};
pub use text_generation::{ChatCompletionGenerator, GenerationError, TextGenerator};

/// Scan `url` with the given probes using default configuration and a
/// local Chrome.
///
/// # Errors
///
/// Only request validation fails; scan failures are reported inside the
/// returned `ScanResult`.
pub async fn run_scan(
    url: &str,
    probes: impl IntoIterator<Item = ProbeName>,
) -> Result<ScanResult, ScanRequestError> {
    let request = ScanRequest::new(url, probes)?;
    let orchestrator = ScanOrchestrator::new(ScanConfig::default());
    Ok(orchestrator.run_scan(&request).await)
}
