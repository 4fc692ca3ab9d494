//! Getter methods for `ScanConfig`

use std::path::Path;
use std::time::Duration;

use super::types::ScanConfig;

impl ScanConfig {
    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&Path> {
        self.chrome_data_dir.as_deref()
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    #[must_use]
    pub fn navigation_timeout_secs(&self) -> u64 {
        self.navigation_timeout_secs
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn probe_timeout_secs(&self) -> u64 {
        self.probe_timeout_secs
    }

    #[must_use]
    pub fn uptime_timeout_secs(&self) -> u64 {
        self.uptime_timeout_secs
    }

    #[must_use]
    pub fn uptime_timeout(&self) -> Duration {
        Duration::from_secs(self.uptime_timeout_secs)
    }

    #[must_use]
    pub fn ai_timeout_secs(&self) -> u64 {
        self.ai_timeout_secs
    }

    #[must_use]
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }

    #[must_use]
    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    #[must_use]
    pub fn concurrent_read_only_probes(&self) -> bool {
        self.concurrent_read_only_probes
    }

    #[must_use]
    pub fn cert_expiry_warning_days(&self) -> i64 {
        self.cert_expiry_warning_days
    }

    #[must_use]
    pub fn axe_script_url(&self) -> &str {
        &self.axe_script_url
    }
}
