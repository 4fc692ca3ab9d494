//! Test utilities shared by the sitescan integration tests
//!
//! Deterministic in-memory browser collaborators with call counters, plus
//! stub probes that succeed, fail or panic on demand.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use futures::future::BoxFuture;
use kodegen_tools_sitescan::page_extractor::js_scripts::NETWORK_IDLE_SCRIPT;
use kodegen_tools_sitescan::{
    BrowserHandle, BrowserLauncher, DocumentResponse, PageAccess, PageHandle, Probe, ProbeName,
    ProbeReport, ScanConfig, ScanSession,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Config with no idle wait and short timeouts
pub fn test_config() -> ScanConfig {
    ScanConfig::builder()
        .network_idle_ms(0)
        .navigation_timeout_secs(5)
        .probe_timeout_secs(5)
        .uptime_timeout_secs(5)
        .ai_timeout_secs(1)
        .build()
        .expect("test config is valid")
}

/// Counters shared between a launcher and every browser/page it creates
#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub navigations: AtomicUsize,
    pub page_closes: AtomicUsize,
    pub browser_closes: AtomicUsize,
    /// evaluations of the network-idle readiness script
    pub idle_checks: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Page with scripted `evaluate` results keyed by script text
pub struct MockPage {
    counters: Arc<Counters>,
    scripts: HashMap<String, serde_json::Value>,
    document: Option<DocumentResponse>,
    fail_navigation: bool,
}

impl PageHandle for MockPage {
    fn set_viewport(&self, _width: u32, _height: u32) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn goto<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.counters.navigations.fetch_add(1, Ordering::SeqCst);
            if self.fail_navigation {
                Err(anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"))
            } else {
                Ok(())
            }
        })
    }

    fn goto_capturing_document<'a>(
        &'a self,
        url: &'a str,
        _timeout: Duration,
    ) -> BoxFuture<'a, Result<DocumentResponse>> {
        Box::pin(async move {
            self.counters.navigations.fetch_add(1, Ordering::SeqCst);
            self.document
                .clone()
                .ok_or_else(|| anyhow!("No document response captured for {url}"))
        })
    }

    fn evaluate<'a>(&'a self, script: &'a str) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async move {
            if script == NETWORK_IDLE_SCRIPT {
                self.counters.idle_checks.fetch_add(1, Ordering::SeqCst);
            }
            self.scripts
                .get(script)
                .cloned()
                .ok_or_else(|| anyhow!("No scripted result for evaluation"))
        })
    }

    fn performance_metrics(&self) -> BoxFuture<'_, Result<BTreeMap<String, f64>>> {
        Box::pin(async { Ok(BTreeMap::new()) })
    }

    fn set_cache_disabled(&self, _disabled: bool) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async {
            self.counters.page_closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

pub struct MockBrowser {
    counters: Arc<Counters>,
    page: Option<Arc<MockPage>>,
}

impl BrowserHandle for MockBrowser {
    fn new_page(&self) -> BoxFuture<'_, Result<Arc<dyn PageHandle>>> {
        Box::pin(async move {
            self.counters.pages_opened.fetch_add(1, Ordering::SeqCst);
            let page = self.page.clone().ok_or_else(|| anyhow!("Target crashed"))?;
            let page: Arc<dyn PageHandle> = page;
            Ok(page)
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.counters.browser_closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Launcher producing `MockBrowser`s that all share one set of counters
pub struct MockLauncher {
    pub counters: Arc<Counters>,
    scripts: Mutex<HashMap<String, serde_json::Value>>,
    document: Mutex<Option<DocumentResponse>>,
    fail_launch: bool,
    fail_page: bool,
    fail_navigation: bool,
}

impl Default for MockLauncher {
    fn default() -> Self {
        let mut scripts = HashMap::new();
        scripts.insert(
            NETWORK_IDLE_SCRIPT.to_string(),
            serde_json::json!({ "readyState": "complete", "resourceCount": 3 }),
        );
        Self {
            counters: Arc::new(Counters::default()),
            scripts: Mutex::new(scripts),
            document: Mutex::new(None),
            fail_launch: false,
            fail_page: false,
            fail_navigation: false,
        }
    }
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn failing_page() -> Self {
        Self {
            fail_page: true,
            ..Self::default()
        }
    }

    pub fn failing_navigation() -> Self {
        Self {
            fail_navigation: true,
            ..Self::default()
        }
    }

    /// Result returned whenever `script` is evaluated
    pub fn with_script(self, script: &str, value: serde_json::Value) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(script.to_string(), value);
        self
    }

    pub fn with_document(self, document: DocumentResponse) -> Self {
        *self.document.lock().expect("document lock") = Some(document);
        self
    }
}

impl BrowserLauncher for MockLauncher {
    fn launch<'a>(
        &'a self,
        _config: &'a ScanConfig,
    ) -> BoxFuture<'a, Result<Box<dyn BrowserHandle>>> {
        Box::pin(async move {
            self.counters.launches.fetch_add(1, Ordering::SeqCst);
            if self.fail_launch {
                return Err(anyhow!("Chrome executable not found"));
            }

            let page = (!self.fail_page).then(|| {
                Arc::new(MockPage {
                    counters: Arc::clone(&self.counters),
                    scripts: self.scripts.lock().expect("scripts lock").clone(),
                    document: self.document.lock().expect("document lock").clone(),
                    fail_navigation: self.fail_navigation,
                })
            });

            let browser: Box<dyn BrowserHandle> = Box::new(MockBrowser {
                counters: Arc::clone(&self.counters),
                page,
            });
            Ok(browser)
        })
    }
}

/// How a `StubProbe` behaves when run
#[derive(Debug, Clone)]
pub enum StubBehavior {
    Score(u8),
    Fail(String),
    Panic,
    Hang,
}

/// Start/finish events in the order runs actually happened
pub type RunLog = Arc<Mutex<Vec<(ProbeName, &'static str)>>>;

pub fn entries(log: &RunLog) -> Vec<(ProbeName, &'static str)> {
    log.lock().expect("run log lock").clone()
}

/// Probe that ignores the page and returns a canned outcome
pub struct StubProbe {
    pub name: ProbeName,
    pub access: PageAccess,
    pub behavior: StubBehavior,
    pub runs: Arc<AtomicUsize>,
    pub log: RunLog,
}

impl StubProbe {
    pub fn new(name: ProbeName, behavior: StubBehavior) -> Self {
        Self {
            name,
            access: PageAccess::ReadOnly,
            behavior,
            runs: Arc::new(AtomicUsize::new(0)),
            log: RunLog::default(),
        }
    }

    pub fn with_log(mut self, log: &RunLog) -> Self {
        self.log = Arc::clone(log);
        self
    }

    fn record(&self, event: &'static str) {
        self.log.lock().expect("run log lock").push((self.name, event));
    }

    pub fn exclusive(mut self) -> Self {
        self.access = PageAccess::Exclusive;
        self
    }
}

impl Probe for StubProbe {
    fn name(&self) -> ProbeName {
        self.name
    }

    fn access(&self) -> PageAccess {
        self.access
    }

    fn timeout_secs(&self) -> u64 {
        1
    }

    fn run<'a>(
        &'a self,
        session: &'a ScanSession,
        _url: &'a str,
    ) -> BoxFuture<'a, Result<ProbeReport>> {
        Box::pin(async move {
            self.runs.fetch_add(1, Ordering::SeqCst);
            // Probes only ever see an open session.
            session.page()?;
            self.record("start");
            // give any concurrently scheduled run a chance to interleave
            tokio::task::yield_now().await;
            let outcome = match &self.behavior {
                StubBehavior::Score(score) => {
                    Ok(ProbeReport::new(*score, Vec::new()).metric("stub", true))
                }
                StubBehavior::Fail(message) => Err(anyhow!("{message}")),
                StubBehavior::Panic => panic!("stub probe exploded"),
                StubBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(ProbeReport::new(100, Vec::new()))
                }
            };
            self.record("finish");
            outcome
        })
    }
}
