// Command-line scanner
//
// Usage: kodegen-sitescan <url> [probe,probe,...]
// Runs one scan with the default configuration and prints the result as JSON.

use anyhow::{Context, Result};
use kodegen_tools_sitescan::{
    ProbeName, ScanConfig, ScanOrchestrator, ScanRequest, TracingProgress,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .context("usage: kodegen-sitescan <url> [probe,probe,...]")?;

    let probes = match args.next() {
        Some(list) => ScanRequest::parse_probes(list.split(','))?,
        None => ProbeName::all().into_iter().collect(),
    };
    let request = ScanRequest::new(url, probes)?;

    let orchestrator =
        ScanOrchestrator::new(ScanConfig::default()).with_progress(Arc::new(TracingProgress));
    let result = orchestrator.run_scan(&request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
