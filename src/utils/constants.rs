//! Shared configuration constants for sitescan
//!
//! Default values and scoring thresholds used throughout the codebase
//! to ensure consistency and avoid magic numbers.

/// Default browser viewport width in CSS pixels
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1920;

/// Default browser viewport height in CSS pixels
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1080;

/// Navigation timeout: 300 seconds
///
/// Applies to the initial session navigation and to every probe that
/// re-navigates the page (performance, security). Slow origins behind
/// CDNs with cold caches routinely need well over a minute.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 300;

/// Uptime check timeout: 30 seconds for the plain HTTP GET
pub const DEFAULT_UPTIME_TIMEOUT_SECS: u64 = 30;

/// Budget for one text-generation round trip inside the AI-insight probe
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Quiet window without new resource entries that counts as "network idle"
pub const DEFAULT_NETWORK_IDLE_MS: u64 = 500;

/// Poll interval while waiting for network idle
pub const NETWORK_IDLE_POLL_MS: u64 = 100;

/// Certificates expiring within this many days produce a warning issue
pub const CERT_EXPIRY_WARNING_DAYS: i64 = 30;

/// Pinned axe-core build injected by the accessibility engine
pub const AXE_CORE_CDN_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/axe-core/4.10.2/axe.min.js";

/// Chrome user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Load time thresholds in milliseconds (good, average)
pub const LOAD_TIME_THRESHOLDS_MS: (f64, f64) = (2000.0, 4000.0);

/// First contentful paint thresholds in milliseconds (good, average)
pub const FCP_THRESHOLDS_MS: (f64, f64) = (1800.0, 3000.0);

/// Speed index thresholds in milliseconds (good, average)
pub const SPEED_INDEX_THRESHOLDS_MS: (f64, f64) = (3400.0, 5800.0);

/// Security headers checked by the security probe, with the points
/// deducted when each one is missing.
pub const SECURITY_HEADERS: [(&str, u32); 5] = [
    ("strict-transport-security", 15),
    ("content-security-policy", 15),
    ("x-frame-options", 10),
    ("x-content-type-options", 10),
    ("referrer-policy", 5),
];
