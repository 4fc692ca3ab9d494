//! Browser automation collaborator contracts
//!
//! The session and probes only talk to the browser through these traits.
//! `chrome` provides the chromiumoxide implementation; tests provide
//! deterministic in-memory ones.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ScanConfig;

/// Starts one browser process per call.
pub trait BrowserLauncher: Send + Sync {
    fn launch<'a>(&'a self, config: &'a ScanConfig)
    -> BoxFuture<'a, Result<Box<dyn BrowserHandle>>>;
}

/// A running browser process owned by exactly one scan session.
pub trait BrowserHandle: Send + Sync {
    fn new_page(&self) -> BoxFuture<'_, Result<Arc<dyn PageHandle>>>;

    /// Close the browser and release its process and profile directory.
    fn close(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// A single browser tab.
pub trait PageHandle: Send + Sync {
    fn set_viewport(&self, width: u32, height: u32) -> BoxFuture<'_, Result<()>>;

    /// Navigate and wait for the load event.
    fn goto<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Navigate while listening on the network domain, returning the main
    /// document's response (status, headers, TLS details).
    fn goto_capturing_document<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<DocumentResponse>>;

    /// Evaluate a JavaScript expression in the page and return its JSON value.
    /// Promises are awaited.
    fn evaluate<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<serde_json::Value>>;

    /// Runtime counters reported by the browser (`Nodes`, `JSHeapUsedSize`, ...).
    fn performance_metrics(&self) -> BoxFuture<'_, Result<BTreeMap<String, f64>>>;

    fn set_cache_disabled(&self, disabled: bool) -> BoxFuture<'_, Result<()>>;

    fn close(&self) -> BoxFuture<'_, Result<()>>;
}

/// Main document response observed during a navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub url: String,
    pub status: u16,
    /// Header names are lowercased.
    pub headers: BTreeMap<String, String>,
    pub certificate: Option<CertificateDetails>,
}

impl DocumentResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// TLS certificate presented for the main document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateDetails {
    pub subject: String,
    pub issuer: String,
    pub protocol: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}
