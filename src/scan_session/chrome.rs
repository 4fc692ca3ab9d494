//! chromiumoxide-backed browser collaborators
//!
//! Each `ChromeLauncher::launch` starts a dedicated Chrome process with its
//! own profile directory, so no two scans ever share browser state.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, ResourceType, SetCacheDisabledParams,
};
use chromiumoxide::cdp::browser_protocol::performance::{
    EnableParams as PerformanceEnableParams, GetMetricsParams,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::handles::{
    BrowserHandle, BrowserLauncher, CertificateDetails, DocumentResponse, PageHandle,
};
use crate::browser_setup::launch_browser;
use crate::config::ScanConfig;

/// Launches a fresh local Chrome per scan session
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeLauncher;

impl BrowserLauncher for ChromeLauncher {
    fn launch<'a>(
        &'a self,
        config: &'a ScanConfig,
    ) -> BoxFuture<'a, Result<Box<dyn BrowserHandle>>> {
        Box::pin(async move {
            let root = config
                .chrome_data_dir()
                .map_or_else(std::env::temp_dir, |dir| dir.to_path_buf());
            let user_data_dir = root.join(format!("sitescan_chrome_{}", uuid::Uuid::new_v4()));

            let (browser, handler) = launch_browser(config, &user_data_dir).await?;
            let handle: Box<dyn BrowserHandle> =
                Box::new(ChromeBrowser::new(browser, handler, user_data_dir));
            Ok(handle)
        })
    }
}

/// Wrapper for Browser and its event handler task
///
/// The handler MUST be aborted when the browser goes away, otherwise it
/// keeps polling a dead websocket.
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl ChromeBrowser {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    /// Remove the profile directory. Must run after `browser.wait()` so
    /// Chrome has released its file handles.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!(target: "sitescan::session", "Cleaning up Chrome data directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    target: "sitescan::session",
                    "Failed to clean up Chrome data directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl BrowserHandle for ChromeBrowser {
    fn new_page(&self) -> BoxFuture<'_, Result<Arc<dyn PageHandle>>> {
        Box::pin(async move {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .context("Failed to create blank page")?;
            let handle: Arc<dyn PageHandle> = Arc::new(ChromePage::new(page));
            Ok(handle)
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut errors = Vec::new();

            if let Err(e) = self.browser.close().await {
                errors.push(format!("Browser close failed: {e}"));
            }
            // Wait for the process to exit, otherwise chromiumoxide warns
            // about a browser that was not closed manually.
            if let Err(e) = self.browser.wait().await {
                errors.push(format!("Browser wait failed: {e}"));
            }
            self.handler.abort();
            self.cleanup_temp_dir();

            if errors.is_empty() {
                Ok(())
            } else {
                Err(anyhow::anyhow!(errors.join("; ")))
            }
        })
    }
}

impl Drop for ChromeBrowser {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop kills the Chrome process
        if self.user_data_dir.is_some() {
            warn!(
                target: "sitescan::session",
                "ChromeBrowser dropped without explicit close - removing profile in Drop"
            );
            self.cleanup_temp_dir();
        }
    }
}

/// A chromiumoxide page
#[derive(Debug, Clone)]
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

impl PageHandle for ChromePage {
    fn set_viewport(&self, width: u32, height: u32) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.page
                .execute(SetDeviceMetricsOverrideParams::new(
                    i64::from(width),
                    i64::from(height),
                    1.0,
                    false,
                ))
                .await
                .context("Failed to set viewport")?;
            Ok(())
        })
    }

    fn goto<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.page
                .goto(url)
                .await
                .with_context(|| format!("Failed to navigate to {url}"))?;
            self.page
                .wait_for_navigation()
                .await
                .with_context(|| format!("Page load failed for {url}"))?;
            Ok(())
        })
    }

    fn goto_capturing_document<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<DocumentResponse>> {
        Box::pin(async move {
            // Listener must exist before navigation starts or the document
            // response is missed.
            let mut responses = self
                .page
                .event_listener::<EventResponseReceived>()
                .await
                .context("Failed to attach network listener")?;

            self.goto(url).await?;

            let event = tokio::time::timeout(timeout, async {
                while let Some(event) = responses.next().await {
                    if event.r#type == ResourceType::Document {
                        return Some(event);
                    }
                }
                None
            })
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for document response of {url}"))?
            .ok_or_else(|| anyhow::anyhow!("No document response observed for {url}"))?;

            let response = &event.response;
            let headers = response
                .headers
                .inner()
                .as_object()
                .map(|map| {
                    map.iter()
                        .map(|(name, value)| {
                            let value = value
                                .as_str()
                                .map_or_else(|| value.to_string(), str::to_string);
                            (name.to_ascii_lowercase(), value)
                        })
                        .collect::<BTreeMap<_, _>>()
                })
                .unwrap_or_default();

            let certificate = response.security_details.as_ref().and_then(|details| {
                Some(CertificateDetails {
                    subject: details.subject_name.clone(),
                    issuer: details.issuer.clone(),
                    protocol: details.protocol.clone(),
                    valid_from: epoch_seconds(*details.valid_from.inner())?,
                    valid_to: epoch_seconds(*details.valid_to.inner())?,
                })
            });

            debug!(
                target: "sitescan::session",
                "Captured document response for {}: status {}, {} headers, tls={}",
                response.url,
                response.status,
                headers.len(),
                certificate.is_some()
            );

            Ok(DocumentResponse {
                url: response.url.clone(),
                status: u16::try_from(response.status).unwrap_or(0),
                headers,
                certificate,
            })
        })
    }

    fn evaluate<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async move {
            let result = self
                .page
                .evaluate(script)
                .await
                .context("Failed to execute page script")?;
            result
                .into_value::<serde_json::Value>()
                .map_err(|e| anyhow::anyhow!("Failed to read script result: {e}"))
        })
    }

    fn performance_metrics(&self) -> BoxFuture<'_, Result<BTreeMap<String, f64>>> {
        Box::pin(async move {
            self.page
                .execute(PerformanceEnableParams::default())
                .await
                .context("Failed to enable performance domain")?;
            let response = self
                .page
                .execute(GetMetricsParams::default())
                .await
                .context("Failed to read performance metrics")?;
            Ok(response
                .result
                .metrics
                .iter()
                .map(|metric| (metric.name.clone(), metric.value))
                .collect())
        })
    }

    fn set_cache_disabled(&self, disabled: bool) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.page
                .execute(SetCacheDisabledParams::new(disabled))
                .await
                .context("Failed to toggle network cache")?;
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            info!(target: "sitescan::session", "Closing page");
            self.page.clone().close().await.context("Failed to close page")?;
            Ok(())
        })
    }
}

fn epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = seconds.trunc() as i64;
    DateTime::from_timestamp(whole, 0)
}
