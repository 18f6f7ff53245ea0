mod config;
mod export;
mod report;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lotwise_core::transactions::parse_transactions_file;
use lotwise_core::{analyze, register_unmapped_securities};
use lotwise_market_data::{QuoteSource, YahooProvider};

use config::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    for warning in cli.ineffective_flag_warnings() {
        warn!("{}", warning);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_banner(&mut out)?;

    info!("Parsing transactions from {}...", cli.input.display());
    let parsed = parse_transactions_file(&cli.input)
        .with_context(|| format!("Failed to read transactions from {}", cli.input.display()))?;
    info!("Found {} valid transactions", parsed.transactions.len());

    let overrides_path = cli.overrides_path();
    if let Err(e) = register_unmapped_securities(&parsed.transactions, &overrides_path) {
        error!(
            "Failed to update ticker mappings file {}: {}",
            overrides_path.display(),
            e
        );
    }

    let source = if cli.with_prices {
        Some(YahooProvider::new().context("Failed to create Yahoo Finance client")?)
    } else {
        None
    };
    let config = cli.analysis_config();
    let analysis = analyze(
        &parsed.transactions,
        &config,
        source.as_ref().map(|s| s as &dyn QuoteSource),
    )?;

    match (&cli.export, cli.can_be_sold) {
        (Some(path), true) => {
            export::export_aged(&analysis, path)?;
            report::write_anomalies(&mut out, &analysis.anomalies)?;
        }
        (Some(path), false) => {
            export::export_positions(&analysis, path)?;
            report::write_anomalies(&mut out, &analysis.anomalies)?;
        }
        (None, true) => report::write_aged_report(&mut out, &analysis)?,
        (None, false) => report::write_positions_report(&mut out, &analysis)?,
    }
    out.flush()?;
    Ok(())
}

/// Text logs by default, JSON when `LOTWISE_LOG_FORMAT=json`. Filtering
/// follows `RUST_LOG`, defaulting to `info`. Records from the `log` crate
/// are forwarded to the same subscriber.
fn init_tracing() {
    let log_format = std::env::var("LOTWISE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init();
    }
}
