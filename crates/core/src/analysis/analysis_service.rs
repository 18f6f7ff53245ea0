use std::collections::HashSet;
use std::path::Path;

use log::{error, info, warn};

use lotwise_market_data::{
    OverrideRow, OverrideTable, QuoteCache, QuoteOptions, QuoteService, QuoteSource,
};

use super::analysis_model::PortfolioAnalysis;
use crate::aging::AgingFilter;
use crate::config::AnalysisConfig;
use crate::errors::{Error, Result};
use crate::ledger::{FifoLedger, OpenPosition};
use crate::transactions::Transaction;
use crate::valuation::{summarize, value_aged, value_positions, ValuedPosition};

/// Run the ledger, and optionally the valuation pass and the aged view.
///
/// An empty transaction set and an invalid configuration are the only
/// errors. Oversells, unresolved symbols, failed fetches and failed cache
/// writes are logged or reported in the result.
pub fn analyze(
    transactions: &[Transaction],
    config: &AnalysisConfig,
    source: Option<&dyn QuoteSource>,
) -> Result<PortfolioAnalysis> {
    config.validate()?;
    if transactions.is_empty() {
        return Err(Error::NoTransactions);
    }

    info!(
        "Processing {} transactions with FIFO logic",
        transactions.len()
    );
    let outcome = FifoLedger::new()
        .with_disposal_tracking(config.track_disposals)
        .apply(transactions);
    if outcome.has_anomalies() {
        warn!(
            "{} disposals could not be fully matched against open lots",
            outcome.anomalies.len()
        );
    }

    let positions = outcome.positions();
    let source = match source {
        Some(source) if config.fetch_prices => Some(source),
        None if config.fetch_prices => {
            warn!("Price lookup requested without a quote source, skipping");
            None
        }
        _ => None,
    };

    let positions = match source {
        Some(source) => value_with_source(positions, config, source),
        None => positions.into_iter().map(ValuedPosition::unpriced).collect(),
    };
    let summary = source.map(|_| {
        summarize(
            positions
                .iter()
                .filter(|valued| !valued.position.is_closed())
                .map(|valued| valued.value),
        )
    });

    let (aged, aged_summary) = if config.aging {
        let filter = AgingFilter::new(config.threshold_years, config.as_of_date);
        let mut aged = filter.filter(&positions);
        info!(
            "{} securities have lots held at least {} years",
            aged.len(),
            config.threshold_years
        );
        let aged_summary = source.map(|_| {
            value_aged(&mut aged);
            summarize(aged.iter().map(|position| position.aged_value))
        });
        (Some(aged), aged_summary)
    } else {
        (None, None)
    };

    Ok(PortfolioAnalysis {
        target_currency: config.target_currency.clone(),
        positions,
        disposals: config.track_disposals.then_some(outcome.disposals),
        anomalies: outcome.anomalies,
        aged,
        summary,
        aged_summary,
        threshold_years: config.threshold_years,
        as_of_date: config.as_of_date,
        valuation_time: config.valuation_time,
    })
}

/// Price every open position through a quote service session, then save
/// the cache and the override table.
fn value_with_source(
    positions: Vec<OpenPosition>,
    config: &AnalysisConfig,
    source: &dyn QuoteSource,
) -> Vec<ValuedPosition> {
    if positions.iter().all(OpenPosition::is_closed) {
        return positions.into_iter().map(ValuedPosition::unpriced).collect();
    }

    info!("Fetching current prices from {}", source.id());
    let overrides = match &config.overrides_path {
        Some(path) => OverrideTable::load(path),
        None => OverrideTable::new(),
    };
    let cache = match &config.cache_path {
        Some(path) => QuoteCache::load(path),
        None => QuoteCache::new(),
    };
    let options = QuoteOptions {
        target_currency: config.target_currency.clone(),
        use_cache: config.use_cache,
        validity: config.cache_validity,
        now: config.valuation_time,
    };

    let mut service = QuoteService::new(source, cache, overrides, options);
    let valued = value_positions(positions, &mut service);
    let (mut cache, mut overrides) = service.into_parts();

    if let Some(path) = &config.cache_path {
        if let Err(e) = cache.save(path, config.valuation_time) {
            error!("Failed to save quote cache: {}", e);
        }
    }
    match overrides.save_if_changed() {
        Ok(true) => warn!(
            "Added unresolved securities to {}, please fill in their symbols",
            overrides
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        ),
        Ok(false) => {}
        Err(e) => error!("Failed to update override table: {}", e),
    }

    valued
}

/// Make sure every security in `transactions` has a row in the override
/// table at `path`, adding empty-symbol rows for the ones that do not.
///
/// Returns the rows that were added, sorted by name.
pub fn register_unmapped_securities(
    transactions: &[Transaction],
    path: impl AsRef<Path>,
) -> Result<Vec<OverrideRow>> {
    let path = path.as_ref();
    let mut table = OverrideTable::load_or_create(path)?;

    let added = table.register_missing(
        transactions
            .iter()
            .map(|t| (t.security_id.as_str(), t.display_name.as_str())),
    );

    if added.is_empty() {
        let unique: HashSet<&str> = transactions
            .iter()
            .map(|t| t.security_id.as_str())
            .collect();
        info!(
            "All {} securities found in {}",
            unique.len(),
            path.display()
        );
        return Ok(added);
    }

    warn!(
        "Found {} securities missing from {}:",
        added.len(),
        path.display()
    );
    for row in &added {
        warn!("  - {} ({})", row.display_name, row.security_id);
    }
    table.save()?;
    warn!(
        "Updated {} - please add missing TICKER symbols manually",
        path.display()
    );
    Ok(added)
}
