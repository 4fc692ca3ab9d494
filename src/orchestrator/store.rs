//! Scan result persistence
//!
//! The orchestrator never persists results itself. Callers hand finished
//! `ScanResult`s to a `ScanResultStore`.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use super::types::ScanResult;

/// Timeout for blocking JSON serialization
const BLOCKING_SERIALIZATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts finished scans keyed by their scan id.
pub trait ScanResultStore: Send + Sync {
    fn save<'a>(&'a self, result: &'a ScanResult) -> BoxFuture<'a, Result<PathBuf>>;
}

/// Writes each result to `<dir>/<scan_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, scan_id: Uuid) -> PathBuf {
        self.dir.join(format!("{scan_id}.json"))
    }

    /// Read a stored result back.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or does not hold a `ScanResult`.
    pub async fn load(&self, scan_id: Uuid) -> Result<ScanResult> {
        let path = self.path_for(scan_id);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl ScanResultStore for JsonFileStore {
    fn save<'a>(&'a self, result: &'a ScanResult) -> BoxFuture<'a, Result<PathBuf>> {
        Box::pin(async move {
            let path = self.path_for(result.scan_id);

            // Serialization is CPU bound on large reports
            let owned = result.clone();
            let blocking_task =
                tokio::task::spawn_blocking(move || serde_json::to_string_pretty(&owned));

            let json = match timeout(BLOCKING_SERIALIZATION_TIMEOUT, blocking_task).await {
                Ok(Ok(serialized)) => serialized?,
                Ok(Err(e)) => return Err(anyhow::anyhow!("JSON serialization task panicked: {e}")),
                Err(_) => {
                    log::warn!(
                        "JSON serialization timeout (timeout: {BLOCKING_SERIALIZATION_TIMEOUT:?})"
                    );
                    return Err(anyhow::anyhow!(
                        "JSON serialization timed out after {BLOCKING_SERIALIZATION_TIMEOUT:?}"
                    ));
                }
            };

            tokio::fs::create_dir_all(&self.dir)
                .await
                .with_context(|| format!("Failed to create {}", self.dir.display()))?;
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            log::debug!("Saved scan {} to {}", result.scan_id, path.display());
            Ok(path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::types::ScanStatus;
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("scans"));

        let result = ScanResult::session_failed(Uuid::new_v4(), "https://example.com", Utc::now(), "launch failed");
        let path = store.save(&result).await.expect("saved");
        assert_eq!(path, store.path_for(result.scan_id));

        let loaded = store.load(result.scan_id).await.expect("loaded");
        assert_eq!(loaded, result);
        assert_eq!(loaded.status, ScanStatus::Failed);
    }

    #[tokio::test]
    async fn test_load_missing_scan_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path());
        assert!(store.load(Uuid::new_v4()).await.is_err());
    }
}
