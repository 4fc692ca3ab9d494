//! AI-insight probe
//!
//! Scores page structure on content, UX and engagement heuristics, then
//! asks the optional text generator for a written review. Generation
//! failures fall back to a template summary; they never fail the probe.

use anyhow::Result;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::scoring::{DeductionLedger, clamp_score};
use super::types::{Issue, ProbeName, ProbeReport, Severity};
use super::{PageAccess, Probe};
use crate::config::ScanConfig;
use crate::page_extractor::extract_page_structure;
use crate::page_extractor::schema::PageStructure;
use crate::scan_session::ScanSession;
use crate::text_generation::{GenerationError, TextGenerator};

const CONTENT_WEIGHT: f64 = 0.4;
const UX_WEIGHT: f64 = 0.35;
const ENGAGEMENT_WEIGHT: f64 = 0.25;

const MIN_PARAGRAPHS: u32 = 3;
const MIN_WORDS: u32 = 300;
const MIN_SOCIAL_LINKS: usize = 2;
const MAX_GENERATED_RECOMMENDATIONS: usize = 5;

static BULLET_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*\u{2022}]|\d+[.)])\s+(.+?)\s*$").expect("Invalid bullet line regex")
});

/// Heuristic sub-scores and their weighted combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightScores {
    pub content: u8,
    pub ux: u8,
    pub engagement: u8,
    pub overall: u8,
}

fn has_text(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn content_ledger(page: &PageStructure) -> DeductionLedger {
    let mut ledger = DeductionLedger::new();
    if !has_text(page.title.as_ref()) {
        ledger.deduct(15, "Page has no title", "Give the page a descriptive title");
    }
    if !has_text(page.meta_description.as_ref()) {
        ledger.deduct(
            15,
            "Page has no meta description",
            "Summarise the page in a meta description",
        );
    }
    if page.paragraph_count < MIN_PARAGRAPHS {
        ledger.deduct(
            20,
            format!("Only {} paragraphs of body copy", page.paragraph_count),
            "Add substantive copy that explains the offering",
        );
    }
    if page.h1_count == 0 {
        ledger.deduct(15, "No main heading", "Lead the page with a clear H1");
    }
    if page.word_count < MIN_WORDS {
        ledger.deduct(
            15,
            format!("Thin content: {} words", page.word_count),
            "Expand the page to at least 300 words of useful content",
        );
    }
    ledger
}

fn ux_ledger(page: &PageStructure) -> DeductionLedger {
    let mut ledger = DeductionLedger::new();
    if !page.has_viewport {
        ledger.deduct(
            25,
            "Layout is not configured for mobile devices",
            "Add a responsive viewport meta tag",
        );
    }
    if !page.has_navigation {
        ledger.deduct(
            20,
            "No navigation menu found",
            "Add a <nav> element linking the main sections",
        );
    }
    if page.images_missing_alt > 0 {
        ledger.deduct(
            15,
            format!("{} images have no alt text", page.images_missing_alt),
            "Describe images with alt text",
        );
    }
    if page.h2_count == 0 {
        ledger.deduct(
            10,
            "Content is not broken up with subheadings",
            "Structure sections with H2 headings",
        );
    }
    ledger
}

fn engagement_ledger(page: &PageStructure) -> DeductionLedger {
    let mut ledger = DeductionLedger::new();
    if !page.has_contact_form {
        ledger.deduct(
            20,
            "No contact form",
            "Offer a short contact or enquiry form",
        );
    }
    if page.social_links.len() < MIN_SOCIAL_LINKS {
        ledger.deduct(
            15,
            format!("Links to {} social profiles", page.social_links.len()),
            "Link to the brand's active social media profiles",
        );
    }
    if page.cta_count == 0 {
        ledger.deduct(
            25,
            "No call-to-action found",
            "Add a prominent call-to-action button",
        );
    }
    if !page.has_email && !page.has_phone {
        ledger.deduct(
            15,
            "No email address or phone number visible",
            "Publish at least one direct contact channel",
        );
    }
    ledger
}

/// Score `page` on content, UX and engagement.
#[must_use]
pub fn calculate_insight_scores(page: &PageStructure) -> (InsightScores, Vec<Issue>) {
    let (content, mut issues) = content_ledger(page).finish();
    let (ux, ux_issues) = ux_ledger(page).finish();
    let (engagement, engagement_issues) = engagement_ledger(page).finish();
    issues.extend(ux_issues);
    issues.extend(engagement_issues);

    let overall = clamp_score(
        f64::from(content) * CONTENT_WEIGHT
            + f64::from(ux) * UX_WEIGHT
            + f64::from(engagement) * ENGAGEMENT_WEIGHT,
    );

    (
        InsightScores {
            content,
            ux,
            engagement,
            overall,
        },
        issues,
    )
}

fn verdict(score: u8) -> &'static str {
    match score {
        80..=100 => "strong",
        60..=79 => "fair",
        _ => "weak",
    }
}

/// Summary used when no generated text is available.
#[must_use]
pub fn heuristic_summary(page: &PageStructure, scores: InsightScores) -> String {
    let title = page
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("This page");
    format!(
        "{title} scores {overall}/100 overall: content is {content} ({c}), user experience is {ux} ({u}) and engagement is {engagement} ({e}). \
         The page has {words} words across {paragraphs} paragraphs with {ctas} calls-to-action.",
        overall = scores.overall,
        content = verdict(scores.content),
        c = scores.content,
        ux = verdict(scores.ux),
        u = scores.ux,
        engagement = verdict(scores.engagement),
        e = scores.engagement,
        words = page.word_count,
        paragraphs = page.paragraph_count,
        ctas = page.cta_count,
    )
}

/// Prompt describing the page structure to the text generator.
#[must_use]
pub fn build_prompt(url: &str, page: &PageStructure, scores: InsightScores) -> String {
    let mut prompt = format!("Review the website at {url}.\n\n");
    let _ = writeln!(prompt, "Title: {}", page.title.as_deref().unwrap_or("(none)"));
    let _ = writeln!(
        prompt,
        "Meta description: {}",
        page.meta_description.as_deref().unwrap_or("(none)")
    );
    let _ = writeln!(prompt, "Headings:");
    for heading in page.headings.iter().take(15) {
        let _ = writeln!(prompt, "  H{}: {}", heading.level, heading.text);
    }
    let _ = writeln!(
        prompt,
        "Words: {}, paragraphs: {}, images: {} ({} without alt)",
        page.word_count, page.paragraph_count, page.image_count, page.images_missing_alt
    );
    let _ = writeln!(
        prompt,
        "Calls-to-action: {} ({})",
        page.cta_count,
        page.cta_texts.join(", ")
    );
    let _ = writeln!(
        prompt,
        "Forms: {}, contact form: {}, email: {}, phone: {}, navigation: {}",
        page.form_count, page.has_contact_form, page.has_email, page.has_phone, page.has_navigation
    );
    let _ = writeln!(prompt, "Social profiles: {}", page.social_links.join(", "));
    let _ = writeln!(
        prompt,
        "\nHeuristic scores: content {}, UX {}, engagement {}.",
        scores.content, scores.ux, scores.engagement
    );
    prompt.push_str("Summarise the page quality and list concrete improvements.");
    prompt
}

/// Split generated text into its summary and bullet recommendations.
#[must_use]
pub fn parse_generated(text: &str) -> (String, Vec<Issue>) {
    let mut summary_lines = Vec::new();
    let mut recommendations = Vec::new();

    for line in text.lines() {
        if let Some(captures) = BULLET_LINE.captures(line) {
            if recommendations.len() >= MAX_GENERATED_RECOMMENDATIONS {
                continue;
            }
            if let Some(item) = captures.get(1) {
                recommendations.push(Issue::new(
                    Severity::Low,
                    format!("Reviewer suggestion: {}", item.as_str()),
                    item.as_str(),
                ));
            }
        } else if !line.trim().is_empty() {
            summary_lines.push(line.trim());
        }
    }

    (summary_lines.join(" "), recommendations)
}

pub struct AiInsightProbe {
    generator: Option<Arc<dyn TextGenerator>>,
    probe_timeout_secs: u64,
    ai_timeout: Duration,
}

impl AiInsightProbe {
    #[must_use]
    pub fn new(config: &ScanConfig, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            generator,
            probe_timeout_secs: config.probe_timeout_secs(),
            ai_timeout: config.ai_timeout(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let generator = self.generator.as_ref().ok_or(GenerationError::NotConfigured)?;
        tokio::time::timeout(self.ai_timeout, generator.generate(prompt))
            .await
            .map_err(|_| GenerationError::Timeout(self.ai_timeout))?
    }
}

impl Probe for AiInsightProbe {
    fn name(&self) -> ProbeName {
        ProbeName::AiInsight
    }

    fn access(&self) -> PageAccess {
        PageAccess::ReadOnly
    }

    fn timeout_secs(&self) -> u64 {
        self.probe_timeout_secs + self.ai_timeout.as_secs()
    }

    fn run<'a>(
        &'a self,
        session: &'a ScanSession,
        url: &'a str,
    ) -> BoxFuture<'a, Result<ProbeReport>> {
        Box::pin(async move {
            let page = extract_page_structure(session.page()?).await?;
            let (scores, mut issues) = calculate_insight_scores(&page);

            let prompt = build_prompt(url, &page, scores);
            let (summary, source) = match self.generate(&prompt).await {
                Ok(text) => {
                    let (summary, suggestions) = parse_generated(&text);
                    debug!(
                        target: "sitescan::probes",
                        "Generated review with {} suggestions",
                        suggestions.len()
                    );
                    issues.extend(suggestions);
                    let summary = if summary.is_empty() {
                        heuristic_summary(&page, scores)
                    } else {
                        summary
                    };
                    (summary, "ai")
                }
                Err(GenerationError::NotConfigured) => (heuristic_summary(&page, scores), "heuristic"),
                Err(e) => {
                    warn!(target: "sitescan::probes", "Text generation failed, using heuristic summary: {e}");
                    (heuristic_summary(&page, scores), "heuristic")
                }
            };

            info!(
                target: "sitescan::probes",
                "AI insight for {url}: {} (content {}, ux {}, engagement {}, {source})",
                scores.overall,
                scores.content,
                scores.ux,
                scores.engagement
            );

            Ok(ProbeReport::new(scores.overall, issues)
                .metric("contentScore", scores.content)
                .metric("uxScore", scores.ux)
                .metric("engagementScore", scores.engagement)
                .metric("wordCount", page.word_count)
                .metric("ctaCount", page.cta_count)
                .metric("socialLinks", page.social_links.len() as u64)
                .metric("summary", summary)
                .metric("insightSource", source))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_extractor::schema::Heading;

    fn complete_page() -> PageStructure {
        PageStructure {
            title: Some("Acme Widgets".to_string()),
            meta_description: Some("Handmade widgets".to_string()),
            headings: vec![Heading {
                level: 1,
                text: "Widgets".to_string(),
            }],
            h1_count: 1,
            h2_count: 4,
            paragraph_count: 8,
            word_count: 900,
            cta_count: 2,
            cta_texts: vec!["Buy now".to_string()],
            form_count: 1,
            has_contact_form: true,
            image_count: 6,
            has_navigation: true,
            has_email: true,
            social_links: vec!["twitter".to_string(), "linkedin".to_string()],
            has_viewport: true,
            ..PageStructure::default()
        }
    }

    #[test]
    fn test_complete_page_scores_100() {
        let (scores, issues) = calculate_insight_scores(&complete_page());
        assert_eq!(
            scores,
            InsightScores {
                content: 100,
                ux: 100,
                engagement: 100,
                overall: 100
            }
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_weighted_sub_scores() {
        let page = PageStructure {
            paragraph_count: 1,
            has_viewport: false,
            has_contact_form: false,
            ..complete_page()
        };
        let (scores, issues) = calculate_insight_scores(&page);
        assert_eq!(scores.content, 80);
        assert_eq!(scores.ux, 75);
        assert_eq!(scores.engagement, 80);
        // 32 + 26.25 + 20
        assert_eq!(scores.overall, 78);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].severity(), Some(Severity::High));
    }

    #[test]
    fn test_empty_page_is_bounded() {
        let (scores, issues) = calculate_insight_scores(&PageStructure::default());
        assert_eq!(scores.content, 20);
        assert_eq!(scores.ux, 45);
        assert_eq!(scores.engagement, 25);
        assert_eq!(scores.overall, 30);
        assert_eq!(issues.len(), 12);
    }

    #[test]
    fn test_parse_generated_text() {
        let text = "The page is clear but thin.\nIt lacks contact options.\n\n- Add a contact form\n* Link social profiles\n2) Expand the copy";
        let (summary, issues) = parse_generated(text);
        assert_eq!(summary, "The page is clear but thin. It lacks contact options.");
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.severity() == Some(Severity::Low)));
        assert_eq!(issues[2].recommendation, "Expand the copy");
    }

    #[test]
    fn test_heuristic_summary_mentions_scores() {
        let (scores, _) = calculate_insight_scores(&complete_page());
        let summary = heuristic_summary(&complete_page(), scores);
        assert!(summary.starts_with("Acme Widgets scores 100/100"));
    }

    #[test]
    fn test_prompt_carries_structure() {
        let page = complete_page();
        let (scores, _) = calculate_insight_scores(&page);
        let prompt = build_prompt("https://acme.test", &page, scores);
        assert!(prompt.contains("https://acme.test"));
        assert!(prompt.contains("H1: Widgets"));
        assert!(prompt.contains("Buy now"));
    }
}
