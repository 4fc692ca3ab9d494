//! Performance probe
//!
//! Reloads the page with the HTTP cache disabled, reads navigation and paint
//! timing plus transferred bytes, and scores FCP, speed index and load time
//! against fixed thresholds.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::scoring::{Thresholds, clamp_score, threshold_score};
use super::types::{Issue, ProbeName, ProbeReport, Severity};
use super::{PageAccess, Probe};
use crate::config::ScanConfig;
use crate::page_extractor::extract_performance_timings;
use crate::page_extractor::schema::PerformanceTimings;
use crate::scan_session::{ScanSession, navigate_and_settle};
use crate::utils::{FCP_THRESHOLDS_MS, LOAD_TIME_THRESHOLDS_MS, SPEED_INDEX_THRESHOLDS_MS};

const HEAVY_PAGE_BYTES: f64 = 3.0 * 1024.0 * 1024.0;
const LARGE_DOM_NODES: u64 = 1500;
const MANY_REQUESTS: u64 = 100;

/// Sub-scores and the weighted result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceScore {
    pub first_contentful_paint: f64,
    pub speed_index: f64,
    pub load_time: f64,
    pub overall: u8,
}

/// `FCP * 0.4 + speedIndex * 0.4 + loadTime * 0.2`, each sub-score from
/// `threshold_score`.
#[must_use]
pub fn calculate_performance_score(
    load_time_ms: f64,
    first_contentful_paint_ms: f64,
    speed_index_ms: f64,
) -> PerformanceScore {
    let fcp = threshold_score(first_contentful_paint_ms, Thresholds::from(FCP_THRESHOLDS_MS));
    let speed_index = threshold_score(speed_index_ms, Thresholds::from(SPEED_INDEX_THRESHOLDS_MS));
    let load_time = threshold_score(load_time_ms, Thresholds::from(LOAD_TIME_THRESHOLDS_MS));

    PerformanceScore {
        first_contentful_paint: fcp,
        speed_index,
        load_time,
        overall: clamp_score(fcp * 0.4 + speed_index * 0.4 + load_time * 0.2),
    }
}

/// FCP as reported, falling back to DOMContentLoaded and then load time
/// when the browser recorded no paint entry.
#[must_use]
pub fn effective_fcp(timings: &PerformanceTimings) -> f64 {
    [
        timings.first_contentful_paint,
        timings.dom_content_loaded,
        timings.load_time,
    ]
    .into_iter()
    .find(|value| *value > 0.0)
    .unwrap_or(0.0)
}

/// A page with no recorded load event has nothing to score.
///
/// # Errors
///
/// Fails when `load_time` is zero or negative.
pub fn require_navigation_timing(timings: &PerformanceTimings) -> Result<()> {
    if timings.load_time <= 0.0 {
        anyhow::bail!("No navigation timing recorded");
    }
    Ok(())
}

/// Speed index estimate without a filmstrip: halfway between first paint
/// and load, never earlier than first paint.
#[must_use]
pub fn estimate_speed_index(first_contentful_paint_ms: f64, load_time_ms: f64) -> f64 {
    first_contentful_paint_ms + (load_time_ms - first_contentful_paint_ms).max(0.0) / 2.0
}

/// Informational findings; they never change the score.
#[must_use]
pub fn diagnose(timings: &PerformanceTimings) -> Vec<Issue> {
    let mut issues = Vec::new();

    let total_bytes = timings.total_bytes();
    if total_bytes > HEAVY_PAGE_BYTES {
        issues.push(Issue::new(
            Severity::Medium,
            format!(
                "Page transfers {:.1} MB of data",
                total_bytes / (1024.0 * 1024.0)
            ),
            "Compress images, enable text compression and defer non-critical scripts",
        ));
    }

    if timings.dom_nodes > LARGE_DOM_NODES {
        issues.push(Issue::new(
            Severity::Low,
            format!("DOM contains {} elements", timings.dom_nodes),
            "Reduce DOM size by removing hidden or redundant markup",
        ));
    }

    if timings.request_count > MANY_REQUESTS {
        issues.push(Issue::new(
            Severity::Low,
            format!("Page makes {} network requests", timings.request_count),
            "Bundle assets and remove unused third-party resources",
        ));
    }

    issues
}

pub struct PerformanceProbe {
    timeout_secs: u64,
}

impl PerformanceProbe {
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            timeout_secs: config.probe_timeout_secs(),
        }
    }
}

impl Probe for PerformanceProbe {
    fn name(&self) -> ProbeName {
        ProbeName::Performance
    }

    fn access(&self) -> PageAccess {
        PageAccess::Exclusive
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn run<'a>(
        &'a self,
        session: &'a ScanSession,
        url: &'a str,
    ) -> BoxFuture<'a, Result<ProbeReport>> {
        Box::pin(async move {
            let page = session.page()?;

            page.set_cache_disabled(true)
                .await
                .context("Failed to disable cache for cold load")?;
            let navigation = navigate_and_settle(page, url, session.config()).await;
            if let Err(e) = page.set_cache_disabled(false).await {
                warn!(target: "sitescan::probes", "Failed to re-enable cache: {e:#}");
            }
            navigation.context("Cold-cache reload failed")?;

            let timings = extract_performance_timings(page).await?;
            require_navigation_timing(&timings)?;
            let runtime = page.performance_metrics().await.unwrap_or_else(|e| {
                debug!(target: "sitescan::probes", "Runtime metrics unavailable: {e:#}");
                BTreeMap::new()
            });

            let fcp = effective_fcp(&timings);
            let speed_index = estimate_speed_index(fcp, timings.load_time);
            let score = calculate_performance_score(timings.load_time, fcp, speed_index);

            info!(
                target: "sitescan::probes",
                "Performance for {url}: {} (FCP {:.0}ms, SI {:.0}ms, load {:.0}ms)",
                score.overall,
                fcp,
                speed_index,
                timings.load_time
            );

            let bytes = &timings.resource_bytes;
            let mut report = ProbeReport::new(score.overall, diagnose(&timings))
                .metric("loadTime", timings.load_time)
                .metric("firstContentfulPaint", fcp)
                .metric("speedIndex", speed_index)
                .metric("timeToInteractive", timings.time_to_interactive)
                .metric("domContentLoaded", timings.dom_content_loaded)
                .metric("domNodes", timings.dom_nodes)
                .metric("requestCount", timings.request_count)
                .metric("documentBytes", timings.document_bytes)
                .metric("scriptBytes", bytes.script)
                .metric("stylesheetBytes", bytes.stylesheet)
                .metric("imageBytes", bytes.image)
                .metric("fontBytes", bytes.font)
                .metric("xhrBytes", bytes.xhr)
                .metric("otherBytes", bytes.other)
                .metric("totalBytes", timings.total_bytes())
                .metric("fcpScore", score.first_contentful_paint.round())
                .metric("speedIndexScore", score.speed_index.round())
                .metric("loadTimeScore", score.load_time.round());

            if let Some(heap) = runtime.get("JSHeapUsedSize") {
                report = report.metric("jsHeapUsedSize", *heap);
            }
            if let Some(layouts) = runtime.get("LayoutCount") {
                report = report.metric("layoutCount", *layouts);
            }

            Ok(report)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fast_page_scores_100() {
        let score = calculate_performance_score(1500.0, 1000.0, 1250.0);
        assert_eq!(score.overall, 100);
    }

    #[test]
    fn test_weighted_combination() {
        // FCP 2400 -> 80, SI 4600 -> 80, load 3000 -> 80
        let score = calculate_performance_score(3000.0, 2400.0, 4600.0);
        assert!((score.first_contentful_paint - 80.0).abs() < 1e-9);
        assert!((score.speed_index - 80.0).abs() < 1e-9);
        assert!((score.load_time - 80.0).abs() < 1e-9);
        assert_eq!(score.overall, 80);

        // FCP 1000 -> 100, SI 5800 -> 60, load 8000 -> 0
        let score = calculate_performance_score(8000.0, 1000.0, 5800.0);
        assert_eq!(score.overall, 64);
    }

    #[test]
    fn test_extreme_load_time_scores_zero() {
        let score = calculate_performance_score(999_999.0, 999_999.0, 999_999.0);
        assert_eq!(score.overall, 0);
        assert!(score.load_time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_effective_fcp_fallbacks() {
        let mut timings = PerformanceTimings {
            load_time: 2500.0,
            dom_content_loaded: 1200.0,
            first_contentful_paint: 900.0,
            ..PerformanceTimings::default()
        };
        assert!((effective_fcp(&timings) - 900.0).abs() < f64::EPSILON);

        timings.first_contentful_paint = 0.0;
        assert!((effective_fcp(&timings) - 1200.0).abs() < f64::EPSILON);

        timings.dom_content_loaded = 0.0;
        assert!((effective_fcp(&timings) - 2500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_load_event_is_an_error() {
        let err = require_navigation_timing(&PerformanceTimings::default()).unwrap_err();
        assert_eq!(err.to_string(), "No navigation timing recorded");

        let paint_only = PerformanceTimings {
            first_contentful_paint: 800.0,
            ..PerformanceTimings::default()
        };
        assert!(require_navigation_timing(&paint_only).is_err());

        let loaded = PerformanceTimings {
            load_time: 1.0,
            ..PerformanceTimings::default()
        };
        assert!(require_navigation_timing(&loaded).is_ok());
    }

    #[test]
    fn test_speed_index_estimate() {
        assert!((estimate_speed_index(1000.0, 3000.0) - 2000.0).abs() < f64::EPSILON);
        // load before paint never pulls the estimate below FCP
        assert!((estimate_speed_index(1000.0, 500.0) - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_diagnostics_for_heavy_page() {
        let timings = PerformanceTimings {
            dom_nodes: 4000,
            request_count: 180,
            document_bytes: 4.0 * 1024.0 * 1024.0,
            ..PerformanceTimings::default()
        };
        let issues = diagnose(&timings);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].severity(), Some(Severity::Medium));

        assert!(diagnose(&PerformanceTimings::default()).is_empty());
    }

    proptest! {
        #[test]
        fn performance_score_is_bounded(
            load in -1.0e9f64..1.0e12,
            fcp in -1.0e9f64..1.0e12,
            si in -1.0e9f64..1.0e12,
        ) {
            let score = calculate_performance_score(load, fcp, si);
            prop_assert!(score.overall <= 100);
        }
    }
}
