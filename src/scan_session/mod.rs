//! Scan session: one browser process and one page for the duration of a scan
//!
//! A `ScanSession` is opened once per scan request, navigated once to the
//! target URL, shared by reference with every probe, and closed exactly once
//! by the orchestrator. Close-time failures are logged and swallowed so they
//! never mask the scan outcome.

pub mod chrome;
pub mod handles;

pub use chrome::{ChromeBrowser, ChromeLauncher, ChromePage};
pub use handles::{
    BrowserHandle, BrowserLauncher, CertificateDetails, DocumentResponse, PageHandle,
};

use anyhow::Result;
use std::future::Future;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::page_extractor::evaluate_into;
use crate::page_extractor::js_scripts::NETWORK_IDLE_SCRIPT;
use crate::utils::NETWORK_IDLE_POLL_MS;

/// Failures that prevent a scan session from being established
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to open page: {0}")]
    PageCreation(String),

    #[error("Failed to load {url}: {message}")]
    Navigation { url: String, message: String },
}

/// The browser + page pair owned by one scan.
pub struct ScanSession {
    url: String,
    browser: Option<Box<dyn BrowserHandle>>,
    page: Option<Arc<dyn PageHandle>>,
    config: ScanConfig,
}

impl std::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("url", &self.url)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ScanSession {
    /// Launch a browser, open a page, apply the viewport and navigate to
    /// `url`, waiting for network idle.
    ///
    /// Any browser that was started is closed again before an error is
    /// returned.
    ///
    /// # Errors
    ///
    /// `SessionError::Launch` when the browser process cannot start,
    /// `SessionError::PageCreation` when no page can be opened, and
    /// `SessionError::Navigation` when the page does not load within
    /// the navigation timeout.
    pub async fn open(
        launcher: &dyn BrowserLauncher,
        config: &ScanConfig,
        url: &str,
    ) -> Result<Self, SessionError> {
        info!(target: "sitescan::session", "Opening scan session for {url}");

        let browser = launcher
            .launch(config)
            .await
            .map_err(|e| SessionError::Launch(format!("{e:#}")))?;

        let mut session = Self {
            url: url.to_string(),
            browser: Some(browser),
            page: None,
            config: config.clone(),
        };

        let page_result = session.browser_ref()?.new_page().await;
        let page = match page_result {
            Ok(page) => page,
            Err(e) => {
                session.close().await;
                return Err(SessionError::PageCreation(format!("{e:#}")));
            }
        };
        session.page = Some(page);

        if let Err(e) = session.load_target().await {
            session.close().await;
            return Err(SessionError::Navigation {
                url: url.to_string(),
                message: format!("{e:#}"),
            });
        }

        info!(target: "sitescan::session", "Scan session ready for {url}");
        Ok(session)
    }

    async fn load_target(&self) -> Result<()> {
        let page = self.page()?;
        let (width, height) = self.config.viewport();
        page.set_viewport(width, height).await?;
        navigate_and_settle(page, &self.url, &self.config).await
    }

    fn browser_ref(&self) -> Result<&dyn BrowserHandle, SessionError> {
        self.browser
            .as_deref()
            .ok_or_else(|| SessionError::Launch("browser already closed".to_string()))
    }

    /// URL this session was opened on
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The session's page.
    ///
    /// # Errors
    ///
    /// Fails once the session has been closed.
    pub fn page(&self) -> Result<&dyn PageHandle> {
        self.page
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Scan session for {} is closed", self.url))
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.browser.is_none() && self.page.is_none()
    }

    /// Close the page, then the browser. Idempotent; never fails.
    pub async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!(target: "sitescan::session", "Failed to close page for {}: {e:#}", self.url);
            } else {
                debug!(target: "sitescan::session", "Page closed for {}", self.url);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!(target: "sitescan::session", "Failed to close browser for {}: {e:#}", self.url);
            } else {
                debug!(target: "sitescan::session", "Browser closed for {}", self.url);
            }
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if !self.is_closed() {
            // Dropping the handles still kills Chrome; only the graceful
            // shutdown is lost.
            warn!(
                target: "sitescan::session",
                "ScanSession for {} dropped without close()",
                self.url
            );
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessSnapshot {
    ready_state: String,
    resource_count: u64,
}

/// Drive `work` to completion or fail with "`label` timed out after N
/// seconds" once `limit` elapses. Errors from `work` pass through as-is.
pub async fn run_bounded<T>(
    label: &str,
    limit: Duration,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, work)
        .await
        .unwrap_or_else(|_| Err(anyhow::anyhow!("{label} timed out after {} seconds", limit.as_secs())))
}

/// Navigate `page` to `url` and wait until the document is complete and no
/// new resources have started for the configured idle window, all within
/// the navigation timeout.
pub async fn navigate_and_settle(
    page: &dyn PageHandle,
    url: &str,
    config: &ScanConfig,
) -> Result<()> {
    run_bounded("Page navigation", config.navigation_timeout(), async {
        page.goto(url).await?;
        wait_for_network_idle(page, config.network_idle()).await;
        Ok(())
    })
    .await
}

/// Wait for network idle on a page that has already been navigated by other
/// means, bounded by the navigation timeout.
pub(crate) async fn settle(page: &dyn PageHandle, config: &ScanConfig) -> Result<()> {
    run_bounded("Page settle", config.navigation_timeout(), async {
        wait_for_network_idle(page, config.network_idle()).await;
        Ok(())
    })
    .await
}

/// Poll until `readyState == complete` and the resource count has been
/// stable for `idle`. Unbounded; callers apply the timeout.
async fn wait_for_network_idle(page: &dyn PageHandle, idle: Duration) {
    let poll_interval = Duration::from_millis(NETWORK_IDLE_POLL_MS);
    let mut last_count: Option<u64> = None;
    let mut stable_since = Instant::now();

    loop {
        match evaluate_into::<ReadinessSnapshot>(page, NETWORK_IDLE_SCRIPT, "readiness").await {
            Ok(snapshot) => {
                if last_count != Some(snapshot.resource_count) {
                    last_count = Some(snapshot.resource_count);
                    stable_since = Instant::now();
                }
                if snapshot.ready_state == "complete" && stable_since.elapsed() >= idle {
                    debug!(
                        target: "sitescan::session",
                        "Network idle with {} resources",
                        snapshot.resource_count
                    );
                    return;
                }
            }
            Err(e) => debug!(target: "sitescan::session", "Readiness check failed: {e:#}, retrying"),
        }

        tokio::time::sleep(poll_interval).await;
    }
}
