//! SEO probe
//!
//! Deducts from a 100-point baseline for each on-page signal that fails:
//! title, meta description, H1 structure, image alt text, mobile viewport
//! and URL hygiene. Each deduction emits one issue whose severity matches
//! its weight.

use anyhow::Result;
use futures::future::BoxFuture;
use tracing::info;

use super::scoring::DeductionLedger;
use super::types::{Issue, ProbeName, ProbeReport, Severity};
use super::{PageAccess, Probe};
use crate::config::ScanConfig;
use crate::page_extractor::extract_seo_signals;
use crate::page_extractor::schema::SeoSignals;
use crate::scan_session::ScanSession;
use crate::utils::{UrlInfo, inspect_url};

const TITLE_LENGTH: (usize, usize) = (30, 60);
const DESCRIPTION_LENGTH: (usize, usize) = (120, 160);
const ALT_POINTS_PER_IMAGE: u32 = 2;
const ALT_MAX_POINTS: u32 = 10;

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Score `signals` for a page served from a URL described by `url_info`.
#[must_use]
pub fn calculate_seo_score(signals: &SeoSignals, url_info: UrlInfo) -> (u8, Vec<Issue>) {
    let mut ledger = DeductionLedger::new();

    match present(signals.title.as_ref()) {
        None => ledger.deduct(
            15,
            "Page is missing a title tag",
            "Add a unique, descriptive <title> of 30-60 characters",
        ),
        Some(title) => {
            let len = title.chars().count();
            if !(TITLE_LENGTH.0..=TITLE_LENGTH.1).contains(&len) {
                ledger.deduct(
                    10,
                    format!("Title length is {len} characters (recommended 30-60)"),
                    "Rewrite the title so it is between 30 and 60 characters",
                );
            }
        }
    }

    match present(signals.meta_description.as_ref()) {
        None => ledger.deduct(
            15,
            "Page is missing a meta description",
            "Add a meta description of 120-160 characters summarising the page",
        ),
        Some(description) => {
            let len = description.chars().count();
            if !(DESCRIPTION_LENGTH.0..=DESCRIPTION_LENGTH.1).contains(&len) {
                ledger.deduct(
                    10,
                    format!("Meta description length is {len} characters (recommended 120-160)"),
                    "Adjust the meta description to between 120 and 160 characters",
                );
            }
        }
    }

    match signals.h1_count {
        0 => ledger.deduct(
            15,
            "Page has no H1 heading",
            "Add exactly one H1 that states the page topic",
        ),
        1 => {}
        n => ledger.deduct(
            10,
            format!("Page has {n} H1 headings"),
            "Keep a single H1 and demote the others to H2/H3",
        ),
    }

    if signals.images_missing_alt > 0 {
        let points = signals
            .images_missing_alt
            .saturating_mul(ALT_POINTS_PER_IMAGE)
            .min(ALT_MAX_POINTS);
        ledger.deduct_with(
            points,
            Severity::Medium,
            format!(
                "{} of {} images are missing alt text",
                signals.images_missing_alt, signals.images_total
            ),
            "Describe every meaningful image with an alt attribute",
        );
    }

    if !signals.has_viewport {
        ledger.deduct(
            15,
            "Page is not mobile responsive: no viewport meta tag",
            "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
        );
    }

    if !url_info.is_https || url_info.has_query_params {
        let problem = match (url_info.is_https, url_info.has_query_params) {
            (false, true) => "URL is not served over HTTPS and carries query parameters",
            (false, false) => "URL is not served over HTTPS",
            _ => "URL carries query parameters",
        };
        ledger.deduct(
            10,
            problem,
            "Serve the page over HTTPS from a clean, parameter-free URL",
        );
    }

    ledger.finish()
}

pub struct SeoProbe {
    timeout_secs: u64,
}

impl SeoProbe {
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            timeout_secs: config.probe_timeout_secs(),
        }
    }
}

impl Probe for SeoProbe {
    fn name(&self) -> ProbeName {
        ProbeName::Seo
    }

    fn access(&self) -> PageAccess {
        PageAccess::ReadOnly
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
            let signals = extract_seo_signals(session.page()?).await?;
            let url_info = inspect_url(url);
            let (score, issues) = calculate_seo_score(&signals, url_info);

            info!(target: "sitescan::probes", "SEO for {url}: {score} ({} issues)", issues.len());

            let title_length = present(signals.title.as_ref()).map_or(0, |t| t.chars().count());
            let description_length =
                present(signals.meta_description.as_ref()).map_or(0, |d| d.chars().count());

            let mut report = ProbeReport::new(score, issues)
                .metric("titleLength", title_length as u64)
                .metric("descriptionLength", description_length as u64)
                .metric("h1Count", signals.h1_count)
                .metric("h2Count", signals.h2_count)
                .metric("h3Count", signals.h3_count)
                .metric("imagesTotal", signals.images_total)
                .metric("imagesMissingAlt", signals.images_missing_alt)
                .metric("internalLinks", signals.internal_links)
                .metric("externalLinks", signals.external_links)
                .metric("hasViewport", signals.has_viewport)
                .metric("isHttps", url_info.is_https)
                .metric("hasQueryParams", url_info.has_query_params);

            if let Some(title) = present(signals.title.as_ref()) {
                report = report.metric("title", title);
            }
            if let Some(canonical) = signals.canonical.as_deref() {
                report = report.metric("canonical", canonical);
            }
            if let Some(lang) = signals.lang.as_deref() {
                report = report.metric("lang", lang);
            }

            Ok(report)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn https() -> UrlInfo {
        UrlInfo {
            is_https: true,
            has_query_params: false,
        }
    }

    fn healthy_signals() -> SeoSignals {
        SeoSignals {
            title: Some("Acme Widgets - Handmade widgets since 1982".to_string()),
            meta_description: Some("a".repeat(140)),
            h1_count: 1,
            h2_count: 3,
            images_total: 4,
            has_viewport: true,
            ..SeoSignals::default()
        }
    }

    #[test]
    fn test_healthy_page_scores_100() {
        let (score, issues) = calculate_seo_score(&healthy_signals(), https());
        assert_eq!(score, 100);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_title_and_description() {
        let signals = SeoSignals {
            title: None,
            meta_description: None,
            ..healthy_signals()
        };
        let (score, issues) = calculate_seo_score(&signals, https());
        assert_eq!(score, 70);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity() == Some(Severity::High)));
    }

    #[test]
    fn test_whitespace_title_counts_as_missing() {
        let signals = SeoSignals {
            title: Some("   ".to_string()),
            ..healthy_signals()
        };
        let (score, issues) = calculate_seo_score(&signals, https());
        assert_eq!(score, 85);
        assert_eq!(issues[0].severity(), Some(Severity::High));
    }

    #[test]
    fn test_length_and_heading_deductions() {
        let signals = SeoSignals {
            title: Some("Short".to_string()),
            meta_description: Some("Too short".to_string()),
            h1_count: 3,
            ..healthy_signals()
        };
        let (score, issues) = calculate_seo_score(&signals, https());
        assert_eq!(score, 70);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.severity() == Some(Severity::Medium)));
    }

    #[test]
    fn test_alt_text_deduction_is_scaled_and_capped() {
        let signals = SeoSignals {
            images_missing_alt: 2,
            ..healthy_signals()
        };
        let (score, issues) = calculate_seo_score(&signals, https());
        assert_eq!(score, 96);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.starts_with("2 of 4 images"));

        let signals = SeoSignals {
            images_missing_alt: 40,
            images_total: 40,
            ..healthy_signals()
        };
        let (score, issues) = calculate_seo_score(&signals, https());
        assert_eq!(score, 90);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity(), Some(Severity::Medium));
    }

    #[test]
    fn test_viewport_and_url_hygiene() {
        let signals = SeoSignals {
            has_viewport: false,
            ..healthy_signals()
        };
        let url_info = inspect_url("http://example.com/?utm_source=x");
        let (score, issues) = calculate_seo_score(&signals, url_info);
        assert_eq!(score, 75);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].description.contains("not mobile responsive"));
        assert_eq!(issues[1].severity(), Some(Severity::Medium));
    }

    #[test]
    fn test_worst_case_floors_at_zero() {
        let signals = SeoSignals {
            h1_count: 0,
            images_missing_alt: 10,
            images_total: 10,
            ..SeoSignals::default()
        };
        let (score, issues) = calculate_seo_score(&signals, inspect_url("http://x.test/?a=1"));
        // 15 + 15 + 15 + 10 + 15 + 10 = 80 points
        assert_eq!(score, 20);
        assert_eq!(issues.len(), 6);
    }

    proptest! {
        #[test]
        fn seo_score_is_bounded(
            h1 in 0u32..50,
            missing_alt in 0u32..10_000,
            viewport in any::<bool>(),
            https in any::<bool>(),
            query in any::<bool>(),
            title_len in 0usize..400,
        ) {
            let signals = SeoSignals {
                title: Some("t".repeat(title_len)),
                h1_count: h1,
                images_missing_alt: missing_alt,
                images_total: missing_alt,
                has_viewport: viewport,
                ..SeoSignals::default()
            };
            let (score, _) = calculate_seo_score(&signals, UrlInfo { is_https: https, has_query_params: query });
            prop_assert!(score <= 100);
        }
    }
}
