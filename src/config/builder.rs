//! Fluent builder for `ScanConfig`
//!
//! Every field has a sensible default, so the builder only validates
//! the combination on `build()`.

use std::path::PathBuf;

use super::types::{ConfigError, ScanConfig};
use crate::utils::is_valid_url;

#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfig {
    /// Create a builder for configuring a `ScanConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }
}

impl ScanConfigBuilder {
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.chrome_data_dir = dir;
        self
    }

    #[must_use]
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.config.navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn uptime_timeout_secs(mut self, secs: u64) -> Self {
        self.config.uptime_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn ai_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ai_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn network_idle_ms(mut self, ms: u64) -> Self {
        self.config.network_idle_ms = ms;
        self
    }

    #[must_use]
    pub fn concurrent_read_only_probes(mut self, enabled: bool) -> Self {
        self.config.concurrent_read_only_probes = enabled;
        self
    }

    #[must_use]
    pub fn cert_expiry_warning_days(mut self, days: i64) -> Self {
        self.config.cert_expiry_warning_days = days;
        self
    }

    #[must_use]
    pub fn axe_script_url(mut self, url: impl Into<String>) -> Self {
        self.config.axe_script_url = url.into();
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a timeout or viewport dimension is zero,
    /// the expiry window is negative, or the axe-core URL is not http(s).
    pub fn build(self) -> Result<ScanConfig, ConfigError> {
        let config = self.config;

        let non_zero = [
            ("viewport_width", u64::from(config.viewport_width)),
            ("viewport_height", u64::from(config.viewport_height)),
            ("navigation_timeout_secs", config.navigation_timeout_secs),
            ("probe_timeout_secs", config.probe_timeout_secs),
            ("uptime_timeout_secs", config.uptime_timeout_secs),
            ("ai_timeout_secs", config.ai_timeout_secs),
        ];
        if let Some(&(field, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroValue { field });
        }

        if config.cert_expiry_warning_days < 0 {
            return Err(ConfigError::NegativeExpiryWindow(
                config.cert_expiry_warning_days,
            ));
        }

        if !is_valid_url(&config.axe_script_url) {
            return Err(ConfigError::InvalidAxeUrl(config.axe_script_url));
        }

        Ok(config)
    }
}
