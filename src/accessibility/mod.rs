//! Accessibility audit engine
//!
//! The accessibility probe delegates rule evaluation to an
//! `AccessibilityEngine`. `AxeCoreEngine` injects axe-core into the loaded
//! page and runs it there; the audit never re-navigates.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::page_extractor::evaluate_into;
use crate::probes::Impact;
use crate::scan_session::PageHandle;

/// One rule result returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub id: String,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: String,
    /// CSS selectors of the affected nodes
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// Categorized audit output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditReport {
    pub violations: Vec<RuleResult>,
    pub passes: Vec<RuleResult>,
    pub incomplete: Vec<RuleResult>,
}

/// WCAG rule engine run against an already-loaded page
pub trait AccessibilityEngine: Send + Sync {
    fn analyze<'a>(&'a self, page: &'a dyn PageHandle) -> BoxFuture<'a, Result<AuditReport>>;
}

const AXE_RUN_SCRIPT: &str = r"
    (async () => {
        if (typeof window.axe === 'undefined') {
            throw new Error('axe-core is not loaded');
        }
        const results = await window.axe.run(document);
        const slim = (rule) => ({
            id: rule.id,
            impact: rule.impact || null,
            description: rule.description || '',
            help: rule.help || '',
            helpUrl: rule.helpUrl || '',
            nodes: (rule.nodes || []).map((node) => (node.target || []).join(' ')),
        });
        return {
            violations: results.violations.map(slim),
            passes: results.passes.map(slim),
            incomplete: results.incomplete.map(slim),
        };
    })()
";

const AXE_PRESENT_SCRIPT: &str = "typeof window.axe !== 'undefined'";

/// Runs axe-core inside the page.
///
/// The axe-core source is downloaded once per engine and reused for every
/// page it analyzes.
pub struct AxeCoreEngine {
    client: reqwest::Client,
    script_url: String,
    source: OnceCell<String>,
}

impl AxeCoreEngine {
    #[must_use]
    pub fn new(client: reqwest::Client, script_url: impl Into<String>) -> Self {
        Self {
            client,
            script_url: script_url.into(),
            source: OnceCell::new(),
        }
    }

    /// Engine that uses `source` instead of downloading axe-core.
    #[must_use]
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            script_url: String::new(),
            source: OnceCell::new_with(Some(source.into())),
        }
    }

    async fn axe_source(&self) -> Result<&str> {
        let source = self
            .source
            .get_or_try_init(|| async {
                info!(target: "sitescan::accessibility", "Downloading axe-core from {}", self.script_url);
                let response = self
                    .client
                    .get(&self.script_url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to download axe-core from {}", self.script_url))?
                    .error_for_status()
                    .context("axe-core download returned an error status")?;
                response
                    .text()
                    .await
                    .context("Failed to read axe-core source")
            })
            .await?;
        Ok(source.as_str())
    }

    async fn ensure_injected(&self, page: &dyn PageHandle) -> Result<()> {
        let present: bool = evaluate_into(page, AXE_PRESENT_SCRIPT, "axe presence")
            .await
            .unwrap_or(false);
        if present {
            return Ok(());
        }

        let source = self.axe_source().await?;
        // Trailing expression so the evaluation has a serializable result.
        let injection = format!("{source}\n;true");
        page.evaluate(&injection)
            .await
            .context("Failed to inject axe-core")?;
        debug!(target: "sitescan::accessibility", "axe-core injected");
        Ok(())
    }
}

impl AccessibilityEngine for AxeCoreEngine {
    fn analyze<'a>(&'a self, page: &'a dyn PageHandle) -> BoxFuture<'a, Result<AuditReport>> {
        Box::pin(async move {
            self.ensure_injected(page).await?;
            let report: AuditReport = evaluate_into(page, AXE_RUN_SCRIPT, "axe-core audit").await?;
            debug!(
                target: "sitescan::accessibility",
                "axe-core: {} violations, {} passes, {} incomplete",
                report.violations.len(),
                report.passes.len(),
                report.incomplete.len()
            );
            Ok(report)
        })
    }
}
