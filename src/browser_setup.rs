//! Chrome discovery and launch
//!
//! Locates a local Chrome/Chromium, falling back to a managed download, and
//! launches it for a single scan session.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::config::ScanConfig;
use crate::utils::CHROME_USER_AGENT;

/// Environment variable naming an explicit browser executable
pub const CHROME_PATH_ENV: &str = "CHROMIUM_PATH";

/// Executable names looked up on `PATH`
const PATH_EXECUTABLES: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Flags for a quiet, unattended browser. TLS errors and web security stay
/// enabled.
const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-print-preview",
    "--disable-setuid-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--metrics-recording-only",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
];

fn install_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if cfg!(target_os = "windows") {
        let roots = ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
            .into_iter()
            .filter_map(|var| std::env::var_os(var).map(PathBuf::from));
        for root in roots {
            locations.push(root.join(r"Google\Chrome\Application\chrome.exe"));
            locations.push(root.join(r"Chromium\Application\chrome.exe"));
        }
    } else if cfg!(target_os = "macos") {
        let bundles = [
            "Google Chrome.app/Contents/MacOS/Google Chrome",
            "Google Chrome Beta.app/Contents/MacOS/Google Chrome Beta",
            "Chromium.app/Contents/MacOS/Chromium",
        ];
        let app_dirs = std::iter::once(PathBuf::from("/Applications"))
            .chain(dirs::home_dir().map(|home| home.join("Applications")));
        for app_dir in app_dirs {
            locations.extend(bundles.iter().map(|bundle| app_dir.join(bundle)));
        }
        locations.push(PathBuf::from("/opt/homebrew/bin/chromium"));
    } else {
        locations.extend(
            [
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
                "/usr/local/bin/chromium",
                "/opt/google/chrome/chrome",
            ]
            .map(PathBuf::from),
        );
    }

    locations
}

fn find_in_dirs(dirs: impl IntoIterator<Item = PathBuf>, names: &[&str]) -> Option<PathBuf> {
    dirs.into_iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

fn search_path(names: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_in_dirs(std::env::split_paths(&path_var), names)
}

/// Find a Chrome/Chromium executable: the `CHROMIUM_PATH` override,
/// then well-known install locations, then `PATH`.
#[must_use]
pub fn find_browser_executable() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CHROME_PATH_ENV).map(PathBuf::from) {
        if path.exists() {
            info!(target: "sitescan::session", "Using browser from {CHROME_PATH_ENV}: {}", path.display());
            return Some(path);
        }
        warn!(
            target: "sitescan::session",
            "{CHROME_PATH_ENV} points to a missing file: {}",
            path.display()
        );
    }

    let found = install_locations()
        .into_iter()
        .find(|path| path.exists())
        .or_else(|| search_path(&PATH_EXECUTABLES));

    match &found {
        Some(path) => debug!(target: "sitescan::session", "Found browser at {}", path.display()),
        None => warn!(target: "sitescan::session", "No local Chrome/Chromium found"),
    }
    found
}

fn managed_browser_dir() -> PathBuf {
    dirs::cache_dir()
        .map_or_else(
            || std::env::temp_dir().join("sitescan_chrome_cache"),
            |dir| dir.join("kodegen").join("sitescan"),
        )
        .join("chromium")
}

/// Download a managed Chromium build into the user cache directory and
/// return its executable path.
///
/// # Errors
///
/// Fails when the cache directory cannot be created or the download fails.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = managed_browser_dir();
    info!(target: "sitescan::session", "Fetching managed Chromium into {}", cache_dir.display());

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .context("Failed to build fetcher options")?;
    let installed = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to download Chromium")?;

    info!(
        target: "sitescan::session",
        "Managed Chromium ready at {}",
        installed.folder_path.display()
    );
    Ok(installed.executable_path)
}

/// chromiumoxide cannot decode every CDP event newer Chrome builds emit;
/// those errors are noise, not failures.
fn is_benign_cdp_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Launch a browser for one scan, with its profile in `user_data_dir`.
///
/// The returned task drives the CDP connection; abort it once the browser
/// has been closed.
///
/// # Errors
///
/// Fails when no executable can be found or downloaded, or Chrome does not
/// start.
pub async fn launch_browser(
    config: &ScanConfig,
    user_data_dir: &Path,
) -> Result<(Browser, JoinHandle<()>)> {
    let executable = match find_browser_executable() {
        Some(path) => path,
        None => download_managed_browser().await?,
    };

    tokio::fs::create_dir_all(user_data_dir)
        .await
        .with_context(|| format!("Failed to create profile dir {}", user_data_dir.display()))?;

    let (width, height) = config.viewport();
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(config.navigation_timeout_secs()))
        .window_size(width, height)
        .user_data_dir(user_data_dir)
        .chrome_executable(executable)
        .arg(format!("--user-agent={CHROME_USER_AGENT}"));
    builder = if config.headless() {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };
    for arg in LAUNCH_ARGS {
        builder = builder.arg(*arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    debug!(target: "sitescan::session", "Launching browser: {browser_config:?}");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_benign_cdp_error(&message) {
                    trace!(target: "sitescan::session", "Ignored CDP decode error: {message}");
                } else {
                    error!(target: "sitescan::session", "Browser handler error: {e:?}");
                }
            }
        }
        debug!(target: "sitescan::session", "Browser handler finished");
    });

    Ok((browser, handler_task))
}
