//! Typed page data extraction functions
//!
//! Each extractor evaluates one script from `js_scripts` and deserializes
//! the result into its `schema` type.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::js_scripts::{
    MIXED_CONTENT_SCRIPT, PAGE_STRUCTURE_SCRIPT, PERFORMANCE_SCRIPT, SEO_SCRIPT,
};
use super::schema::{MixedContentItem, PageStructure, PerformanceTimings, SeoSignals};
use crate::scan_session::PageHandle;

/// Evaluate `script` and deserialize its JSON result
pub async fn evaluate_into<T: DeserializeOwned>(
    page: &dyn PageHandle,
    script: &str,
    what: &str,
) -> Result<T> {
    let value = page
        .evaluate(script)
        .await
        .with_context(|| format!("Failed to execute {what} extraction script"))?;

    serde_json::from_value(value).with_context(|| format!("Failed to parse {what} from JS result"))
}

pub async fn extract_performance_timings(page: &dyn PageHandle) -> Result<PerformanceTimings> {
    let timings: PerformanceTimings = evaluate_into(page, PERFORMANCE_SCRIPT, "performance").await?;

    log::debug!(
        "Extracted timings - load: {:.0}ms, FCP: {:.0}ms, TTI: {:.0}ms, requests: {}, DOM nodes: {}",
        timings.load_time,
        timings.first_contentful_paint,
        timings.time_to_interactive,
        timings.request_count,
        timings.dom_nodes
    );

    Ok(timings)
}

pub async fn extract_seo_signals(page: &dyn PageHandle) -> Result<SeoSignals> {
    let signals: SeoSignals = evaluate_into(page, SEO_SCRIPT, "SEO signals").await?;

    log::debug!(
        "Extracted SEO signals - H1: {}, images: {} ({} without alt), links: {} internal / {} external",
        signals.h1_count,
        signals.images_total,
        signals.images_missing_alt,
        signals.internal_links,
        signals.external_links
    );

    Ok(signals)
}

pub async fn extract_mixed_content(page: &dyn PageHandle) -> Result<Vec<MixedContentItem>> {
    evaluate_into(page, MIXED_CONTENT_SCRIPT, "mixed content").await
}

pub async fn extract_page_structure(page: &dyn PageHandle) -> Result<PageStructure> {
    let structure: PageStructure =
        evaluate_into(page, PAGE_STRUCTURE_SCRIPT, "page structure").await?;

    log::debug!(
        "Extracted page structure - words: {}, CTAs: {}, forms: {}, social platforms: {}",
        structure.word_count,
        structure.cta_count,
        structure.form_count,
        structure.social_links.len()
    );

    Ok(structure)
}
