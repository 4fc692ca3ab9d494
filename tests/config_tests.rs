//! Tests for the scan configuration builder

use kodegen_tools_sitescan::config::{ConfigError, ScanConfig};
use kodegen_tools_sitescan::utils::AXE_CORE_CDN_URL;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_builder_defaults_match_default() {
    let built = ScanConfig::builder().build().unwrap();
    assert_eq!(built, ScanConfig::default());

    assert!(built.headless());
    assert_eq!(built.chrome_data_dir(), None);
    assert_eq!(built.viewport(), (1920, 1080));
    assert_eq!(built.navigation_timeout_secs(), 300);
    assert_eq!(built.probe_timeout_secs(), 300);
    assert_eq!(built.uptime_timeout(), Duration::from_secs(30));
    assert_eq!(built.ai_timeout(), Duration::from_secs(60));
    assert_eq!(built.network_idle(), Duration::from_millis(500));
    assert!(!built.concurrent_read_only_probes());
    assert_eq!(built.cert_expiry_warning_days(), 30);
    assert_eq!(built.axe_script_url(), AXE_CORE_CDN_URL);
}

#[test]
fn test_builder_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let config = ScanConfig::builder()
        .headless(false)
        .chrome_data_dir(Some(temp_dir.path().to_path_buf()))
        .viewport(390, 844)
        .navigation_timeout_secs(45)
        .probe_timeout_secs(60)
        .uptime_timeout_secs(10)
        .ai_timeout_secs(20)
        .network_idle_ms(0)
        .concurrent_read_only_probes(true)
        .cert_expiry_warning_days(14)
        .axe_script_url("http://localhost:8080/axe.min.js")
        .build()
        .unwrap();

    assert!(!config.headless());
    assert_eq!(config.chrome_data_dir(), Some(temp_dir.path()));
    assert_eq!(config.viewport(), (390, 844));
    assert_eq!(config.navigation_timeout(), Duration::from_secs(45));
    assert_eq!(config.probe_timeout_secs(), 60);
    assert_eq!(config.uptime_timeout_secs(), 10);
    assert_eq!(config.ai_timeout_secs(), 20);
    // zero idle window is allowed: settle as soon as the document is complete
    assert_eq!(config.network_idle(), Duration::ZERO);
    assert!(config.concurrent_read_only_probes());
    assert_eq!(config.cert_expiry_warning_days(), 14);
    assert_eq!(config.axe_script_url(), "http://localhost:8080/axe.min.js");
}

#[test]
fn test_zero_values_are_rejected() {
    let err = ScanConfig::builder().viewport(0, 800).build().unwrap_err();
    assert_eq!(err, ConfigError::ZeroValue { field: "viewport_width" });

    let err = ScanConfig::builder().viewport(1280, 0).build().unwrap_err();
    assert_eq!(err, ConfigError::ZeroValue { field: "viewport_height" });

    let err = ScanConfig::builder().navigation_timeout_secs(0).build().unwrap_err();
    assert_eq!(err, ConfigError::ZeroValue { field: "navigation_timeout_secs" });

    let err = ScanConfig::builder().probe_timeout_secs(0).build().unwrap_err();
    assert_eq!(err, ConfigError::ZeroValue { field: "probe_timeout_secs" });

    let err = ScanConfig::builder().uptime_timeout_secs(0).build().unwrap_err();
    assert_eq!(err, ConfigError::ZeroValue { field: "uptime_timeout_secs" });

    let err = ScanConfig::builder().ai_timeout_secs(0).build().unwrap_err();
    assert_eq!(err, ConfigError::ZeroValue { field: "ai_timeout_secs" });
    assert_eq!(err.to_string(), "ai_timeout_secs must be greater than zero");
}

#[test]
fn test_negative_expiry_window_is_rejected() {
    let err = ScanConfig::builder()
        .cert_expiry_warning_days(-1)
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::NegativeExpiryWindow(-1));

    // zero only warns on the expiry day itself
    assert!(ScanConfig::builder().cert_expiry_warning_days(0).build().is_ok());
}

#[test]
fn test_axe_url_must_be_http() {
    for url in ["", "file:///opt/axe.min.js", "axe.min.js", "javascript:alert(1)"] {
        let err = ScanConfig::builder().axe_script_url(url).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidAxeUrl(url.to_string()));
    }
}

#[test]
fn test_config_serde_roundtrip_keeps_data_dir() {
    let config = ScanConfig::builder()
        .chrome_data_dir(Some(PathBuf::from("/var/tmp/sitescan")))
        .build()
        .unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let back: ScanConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
