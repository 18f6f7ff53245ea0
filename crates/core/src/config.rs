//! Analysis configuration.
//!
//! Everything a run depends on is passed in through [`AnalysisConfig`];
//! nothing in this crate reads environment variables or picks file
//! locations on its own.

use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::constants::{
    DEFAULT_AGING_THRESHOLD_YEARS, DEFAULT_CACHE_VALIDITY_HOURS, DEFAULT_TARGET_CURRENCY,
};
use crate::errors::{Error, Result};

/// Settings for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Currency all values are reported in
    pub target_currency: String,
    /// Minimum holding period, in years, for the aged view
    pub threshold_years: f64,
    /// Reference date for holding periods
    pub as_of_date: NaiveDate,
    /// Record matched disposals alongside the open lots
    pub track_disposals: bool,
    /// Produce the aged view
    pub aging: bool,
    /// Look up current prices
    pub fetch_prices: bool,
    /// Reuse cached quotes and exchange rates that are still fresh
    pub use_cache: bool,
    /// Quote cache file; without one the cache lives for this run only
    pub cache_path: Option<PathBuf>,
    /// Override table file; without one overrides live for this run only
    pub overrides_path: Option<PathBuf>,
    /// Lifetime of cached quotes and exchange rates
    pub cache_validity: Duration,
    /// Clock reading used for cache freshness and new cache entries
    pub valuation_time: DateTime<Utc>,
}

impl AnalysisConfig {
    /// Library defaults for everything except the clock, which the caller
    /// supplies: ledger only, EUR, a 3 year threshold and a 24 hour cache.
    pub fn new(as_of_date: NaiveDate, valuation_time: DateTime<Utc>) -> Self {
        Self {
            target_currency: DEFAULT_TARGET_CURRENCY.to_string(),
            threshold_years: DEFAULT_AGING_THRESHOLD_YEARS,
            as_of_date,
            track_disposals: false,
            aging: false,
            fetch_prices: false,
            use_cache: true,
            cache_path: None,
            overrides_path: None,
            cache_validity: Duration::hours(DEFAULT_CACHE_VALIDITY_HOURS),
            valuation_time,
        }
    }

    /// Reject settings no run could produce a meaningful result with.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_years.is_finite() || self.threshold_years <= 0.0 {
            return Err(Error::InvalidConfigValue(format!(
                "threshold_years must be a positive number, got {}",
                self.threshold_years
            )));
        }
        if self.target_currency.trim().is_empty() {
            return Err(Error::InvalidConfigValue(
                "target_currency must not be empty".to_string(),
            ));
        }
        if self.cache_validity <= Duration::zero() {
            return Err(Error::InvalidConfigValue(
                "cache_validity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
