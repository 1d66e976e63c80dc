//! Catalog Sweep command-line application.
//!
//! This is the thin shell that resolves configuration, wires the sweep
//! engine to a live HTTP transport and writes the export. Core logic lives
//! in the `crates/` directory.

pub mod cli;

pub use cli::Cli;

use anyhow::{Context, Result};
use harvest_core::{AppConfig, HarvestError};
use harvest_export::{project, write_projection};
use harvest_sweep::{
    parse_endpoint, CatalogTransport, HarvestReport, HttpTransport, PageFetcher, ParameterSpace,
    RequestAuthenticator, SweepOrchestrator,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// The sweep report, records included
    pub report: HarvestReport,
    /// Rows written to the export
    pub rows_written: usize,
    /// Export destination
    pub output_path: PathBuf,
}

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalog_sweep=debug,harvest=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Resolve the effective configuration: file (or defaults), then
/// environment, then command-line flags, then validation.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_with_env(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Run a sweep against the live catalog.
pub async fn run(config: &AppConfig) -> Result<RunSummary> {
    let transport = HttpTransport::new(Duration::from_secs(config.api.timeout_secs))
        .context("failed to build HTTP client")?;
    run_with_transport(config, Arc::new(transport)).await
}

/// Run a sweep over an arbitrary transport.
///
/// Bootstrap failure aborts the run before any data request is made.
pub async fn run_with_transport(
    config: &AppConfig,
    transport: Arc<dyn CatalogTransport>,
) -> Result<RunSummary> {
    info!("Starting catalog-sweep v{}", env!("CARGO_PKG_VERSION"));

    let auth =
        Arc::new(RequestAuthenticator::from_config(&config.api).map_err(HarvestError::from)?);
    let bootstrap_urls = config
        .api
        .bootstrap_urls
        .iter()
        .map(String::as_str)
        .map(parse_endpoint)
        .collect::<harvest_sweep::Result<Vec<_>>>()
        .map_err(HarvestError::from)?;
    let endpoint = parse_endpoint(&config.api.offers_url).map_err(HarvestError::from)?;
    let space = ParameterSpace::from_config(&config.space).map_err(HarvestError::from)?;

    auth.bootstrap(transport.as_ref(), &bootstrap_urls)
        .await
        .map_err(HarvestError::from)?;

    let fetcher = PageFetcher::new(transport, auth, endpoint);
    let report = SweepOrchestrator::from_config(fetcher, &config.sweep)
        .run(&space)
        .await;

    let projection = project(&report.records, &config.export.columns);
    let output_path = config.export.output_path.clone();
    let rows_written = write_projection(&output_path, config.export.format, &projection)
        .map_err(HarvestError::from)?;

    info!(
        records = report.records.len(),
        duplicates = report.duplicates,
        cap_reached = report.cap_reached,
        completed = report.combinations_completed,
        total = report.combinations_total,
        in_flight_at_stop = report.in_flight_at_stop,
        terminations = ?report.terminations,
        output = %output_path.display(),
        "sweep finished"
    );

    Ok(RunSummary {
        report,
        rows_written,
        output_path,
    })
}
