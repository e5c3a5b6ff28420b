//! a11y-gate command line entry point
//!
//! Exit codes: 0 every journey clean, 1 audit findings or a failed journey
//! expectation, 2 the tooling itself failed.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use a11y_gate::config::GateConfig;
use a11y_gate::playwright::{AxeScanner, Browser, PlaywrightPage};
use a11y_gate::{AuditGate, AuditReconciler, Journey, JourneyRunner};

#[derive(Parser, Debug)]
#[command(name = "a11y-gate")]
#[command(about = "Accessibility regression gate for web journeys")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "a11y-gate.toml")]
    config: PathBuf,

    /// Directory of journey YAML files (overrides config)
    #[arg(short, long)]
    journeys: Option<PathBuf>,

    /// Run only the journey with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Run only journeys with this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Directory for audit artifacts and the run report (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns `Ok(false)` when a journey failed its audit, `Err` when the run
/// could not be trusted.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = GateConfig::load(&cli.config)?;
    if let Some(dir) = cli.journeys {
        config.journeys_dir = dir;
    }
    if let Some(dir) = cli.output {
        config.results_dir = dir;
    }
    if let Some(browser) = cli.browser {
        config.playwright.browser = browser;
    }
    if cli.headed {
        config.playwright.headless = false;
    }

    let journeys: Vec<Journey> = Journey::load_all(&config.journeys_dir)?
        .into_iter()
        .filter(|j| cli.name.as_ref().map_or(true, |n| &j.name == n))
        .filter(|j| cli.tag.as_ref().map_or(true, |t| j.tags.contains(t)))
        .collect();

    if journeys.is_empty() {
        anyhow::bail!("no journeys found in {}", config.journeys_dir.display());
    }

    let gate = AuditGate::with_tags(
        AxeScanner::new(),
        AuditReconciler::new(&config.results_dir),
        config.tags.clone(),
    )?;
    let runner = JourneyRunner::new(gate);

    let playwright = config.playwright.clone();
    let suite = runner
        .run_all(&journeys, || PlaywrightPage::new(playwright.clone()))
        .await;
    suite.write(&config.report_path())?;

    if suite.has_tooling_failures() {
        anyhow::bail!("{} journey(s) failed, at least one because of a tooling error", suite.failed);
    }

    info!("{} of {} journey(s) passed", suite.passed, suite.total);
    Ok(suite.failed == 0)
}
