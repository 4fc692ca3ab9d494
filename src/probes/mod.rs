//! Analysis probes
//!
//! A probe inspects one dimension of a page (performance, SEO, security,
//! accessibility, uptime, content insight) and produces a bounded 0..=100
//! score with structured issues. Probes are looked up through a
//! `ProbeRegistry` keyed by `ProbeName`.

pub mod accessibility;
pub mod ai_insight;
pub mod performance;
pub mod scoring;
pub mod security;
pub mod seo;
pub mod types;
pub mod uptime;

pub use accessibility::AccessibilityProbe;
pub use ai_insight::AiInsightProbe;
pub use performance::PerformanceProbe;
pub use security::SecurityProbe;
pub use seo::SeoProbe;
pub use types::{
    Impact, Issue, IssueLevel, MetricValue, Priority, ProbeName, ProbeReport, ProbeResult,
    RawMetrics, Severity,
};
pub use uptime::UptimeProbe;

use anyhow::Result;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::accessibility::{AccessibilityEngine, AxeCoreEngine};
use crate::config::ScanConfig;
use crate::scan_session::ScanSession;
use crate::text_generation::TextGenerator;

/// How a probe uses the shared page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAccess {
    /// Re-navigates or attaches to the page's protocol session; must run alone.
    Exclusive,
    /// Only reads the already-loaded DOM.
    ReadOnly,
    /// Does not touch the page at all.
    Detached,
}

/// One analysis unit
pub trait Probe: Send + Sync {
    fn name(&self) -> ProbeName;

    fn access(&self) -> PageAccess;

    /// Upper bound for one `run`, enforced by the orchestrator
    fn timeout_secs(&self) -> u64;

    fn run<'a>(&'a self, session: &'a ScanSession, url: &'a str)
    -> BoxFuture<'a, Result<ProbeReport>>;
}

/// Collaborators shared by the standard probes
#[derive(Clone)]
pub struct ProbeDependencies {
    pub http_client: reqwest::Client,
    pub accessibility_engine: Arc<dyn AccessibilityEngine>,
    pub text_generator: Option<Arc<dyn TextGenerator>>,
}

impl ProbeDependencies {
    /// Default collaborators: a plain reqwest client, the axe-core engine
    /// and the text generator configured in the environment, if any.
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        let http_client = reqwest::Client::new();
        Self {
            accessibility_engine: Arc::new(AxeCoreEngine::new(
                http_client.clone(),
                config.axe_script_url(),
            )),
            text_generator: crate::text_generation::ChatCompletionGenerator::from_env()
                .map(|generator| Arc::new(generator) as Arc<dyn TextGenerator>),
            http_client,
        }
    }
}

/// Static table mapping each `ProbeName` to its implementation
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    probes: BTreeMap<ProbeName, Arc<dyn Probe>>,
}

impl ProbeRegistry {
    /// Empty registry; every lookup fails until probes are registered
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all six standard probes
    #[must_use]
    pub fn standard(config: &ScanConfig, deps: ProbeDependencies) -> Self {
        Self::new()
            .with_probe(Arc::new(PerformanceProbe::new(config)))
            .with_probe(Arc::new(SeoProbe::new(config)))
            .with_probe(Arc::new(SecurityProbe::new(config)))
            .with_probe(Arc::new(AccessibilityProbe::new(
                config,
                deps.accessibility_engine,
            )))
            .with_probe(Arc::new(UptimeProbe::new(config, deps.http_client)))
            .with_probe(Arc::new(AiInsightProbe::new(config, deps.text_generator)))
    }

    /// Register `probe` under its own name, replacing any previous entry
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probes.insert(probe.name(), probe);
        self
    }

    #[must_use]
    pub fn get(&self, name: ProbeName) -> Option<Arc<dyn Probe>> {
        self.probes.get(&name).cloned()
    }

    #[must_use]
    pub fn names(&self) -> Vec<ProbeName> {
        self.probes.keys().copied().collect()
    }
}

impl std::fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRegistry")
            .field("probes", &self.names())
            .finish()
    }
}
