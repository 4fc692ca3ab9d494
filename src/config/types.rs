//! Core configuration types for website scans
//!
//! This module contains the `ScanConfig` struct that defines browser,
//! timeout and probe parameters for one orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::{
    AXE_CORE_CDN_URL, CERT_EXPIRY_WARNING_DAYS, DEFAULT_AI_TIMEOUT_SECS,
    DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_NETWORK_IDLE_MS, DEFAULT_UPTIME_TIMEOUT_SECS,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};

/// Main configuration struct for scan operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub(crate) headless: bool,

    /// Chrome user data directory root.
    ///
    /// Each session creates its own profile directory below this root so
    /// that concurrent scans never share a browser profile. When `None`
    /// the system temp directory is used.
    pub(crate) chrome_data_dir: Option<PathBuf>,

    pub(crate) viewport_width: u32,
    pub(crate) viewport_height: u32,

    /// Timeout in seconds for the initial `page.goto()` plus network idle wait
    ///
    /// Default: 300 seconds
    pub(crate) navigation_timeout_secs: u64,

    /// Timeout in seconds for each navigation-bound probe as a whole
    ///
    /// Default: 300 seconds
    pub(crate) probe_timeout_secs: u64,

    /// Timeout in seconds for the uptime probe's HTTP GET
    ///
    /// Default: 30 seconds
    pub(crate) uptime_timeout_secs: u64,

    /// Timeout in seconds for one text-generation call
    ///
    /// Default: 60 seconds
    pub(crate) ai_timeout_secs: u64,

    /// Quiet window in milliseconds used to detect network idle
    pub(crate) network_idle_ms: u64,

    /// Run SEO, accessibility, uptime and AI-insight probes concurrently
    /// once the exclusive probes have finished.
    ///
    /// Default: false (strict canonical order)
    pub(crate) concurrent_read_only_probes: bool,

    /// Days before certificate expiry that trigger a warning issue
    pub(crate) cert_expiry_warning_days: i64,

    /// Where the accessibility engine downloads axe-core from
    pub(crate) axe_script_url: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_data_dir: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            uptime_timeout_secs: DEFAULT_UPTIME_TIMEOUT_SECS,
            ai_timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
            network_idle_ms: DEFAULT_NETWORK_IDLE_MS,
            concurrent_read_only_probes: false,
            cert_expiry_warning_days: CERT_EXPIRY_WARNING_DAYS,
            axe_script_url: AXE_CORE_CDN_URL.to_string(),
        }
    }
}

/// Validation failures raised by `ScanConfigBuilder::build`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("Invalid axe-core script URL '{0}': expected an http(s) URL")]
    InvalidAxeUrl(String),

    #[error("cert_expiry_warning_days must not be negative (got {0})")]
    NegativeExpiryWindow(i64),
}
