//! Quote cache store.
//!
//! One JSON document holding the last price lookup per security and the
//! last fetched exchange rate per currency pair. Loaded once at the start
//! of a run, mutated in memory, written once at the end.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{fx_pair_key, FxCacheEntry, QuoteCacheEntry, SecurityId};

/// Version written into new cache files.
pub const CACHE_FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    CACHE_FORMAT_VERSION.to_string()
}

/// Persisted quote and exchange rate cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteCache {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    prices: BTreeMap<SecurityId, QuoteCacheEntry>,

    /// Keyed by concatenated pair, e.g. "USDEUR"
    #[serde(default)]
    exchange_rates: BTreeMap<String, FxCacheEntry>,
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self {
            version: default_version(),
            last_updated: None,
            prices: BTreeMap::new(),
            exchange_rates: BTreeMap::new(),
        }
    }
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a cache file. A missing file is an empty cache.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No quote cache at {}", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path).map_err(|e| MarketDataError::storage(path, e))?;
        let cache: Self =
            serde_json::from_str(&content).map_err(|e| MarketDataError::storage(path, e))?;
        debug!(
            "Loaded quote cache from {} ({} prices, {} rates)",
            path.display(),
            cache.prices.len(),
            cache.exchange_rates.len()
        );
        Ok(cache)
    }

    /// Read a cache file, starting empty when it cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path) {
            Ok(cache) => cache,
            Err(e) => {
                warn!("Could not load quote cache, starting fresh: {}", e);
                Self::new()
            }
        }
    }

    /// Write the cache, creating parent directories as needed.
    ///
    /// Unresolved entries are dropped first; they are never persisted.
    pub fn save(&mut self, path: impl AsRef<Path>, now: DateTime<Utc>) -> Result<(), MarketDataError> {
        let path = path.as_ref();
        self.purge_unresolved();
        self.last_updated = Some(now);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MarketDataError::storage(parent, e))?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| MarketDataError::storage(path, e))?;
        fs::write(path, content).map_err(|e| MarketDataError::storage(path, e))?;
        debug!("Saved quote cache to {}", path.display());
        Ok(())
    }

    pub fn get(&self, security_id: &str) -> Option<&QuoteCacheEntry> {
        self.prices.get(security_id)
    }

    pub fn insert(&mut self, security_id: impl Into<SecurityId>, entry: QuoteCacheEntry) {
        self.prices.insert(security_id.into(), entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SecurityId, &QuoteCacheEntry)> {
        self.prices.iter()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Remove every entry whose symbol was unresolved. Returns how many went.
    pub fn purge_unresolved(&mut self) -> usize {
        let before = self.prices.len();
        self.prices.retain(|_, entry| !entry.is_unresolved());
        before - self.prices.len()
    }

    pub fn fx_rate(&self, from: &str, to: &str) -> Option<&FxCacheEntry> {
        self.exchange_rates.get(&fx_pair_key(from, to))
    }

    pub fn insert_fx_rate(&mut self, from: &str, to: &str, entry: FxCacheEntry) {
        self.exchange_rates.insert(fx_pair_key(from, to), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_cache() {
        let dir = tempdir().unwrap();
        let cache = QuoteCache::load(dir.path().join("absent.json"));
        assert!(cache.is_empty());
        assert_eq!(cache.version, CACHE_FORMAT_VERSION);
    }

    #[test]
    fn test_corrupt_file_is_empty_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(QuoteCache::try_load(&path).unwrap_err().is_storage());
        assert!(QuoteCache::load(&path).is_empty());
    }

    #[test]
    fn test_save_drops_unresolved_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("cache.json");

        let mut cache = QuoteCache::new();
        cache.insert(
            "US0378331005",
            QuoteCacheEntry::success("AAPL", dec!(190), "USD", dec!(171), now()),
        );
        cache.insert("XX0000000000", QuoteCacheEntry::unresolved(now()));
        cache.insert_fx_rate("USD", "EUR", FxCacheEntry::new(dec!(0.9), now()));

        cache.save(&path, now()).unwrap();
        let reloaded = QuoteCache::try_load(&path).unwrap();

        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get("XX0000000000").is_none());
        assert_eq!(
            reloaded.get("US0378331005").and_then(|e| e.target_price),
            Some(dec!(171))
        );
        assert_eq!(reloaded.fx_rate("USD", "EUR").map(|e| e.rate), Some(dec!(0.9)));
        assert_eq!(reloaded.last_updated, Some(now()));
    }

    #[test]
    fn test_reads_legacy_status_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(
            &path,
            r#"{
                "version": "1.0",
                "prices": {
                    "US0000000001": {
                        "resolved_symbol": "FOO",
                        "native_price": null,
                        "native_currency": null,
                        "target_price": null,
                        "status": "api_error",
                        "fetched_at": "2024-05-01T10:00:00Z"
                    },
                    "US0000000002": {
                        "resolved_symbol": null,
                        "native_price": null,
                        "native_currency": null,
                        "target_price": null,
                        "status": "ticker_not_found",
                        "fetched_at": "2024-05-01T10:00:00Z"
                    }
                }
            }"#,
        )
        .unwrap();

        let mut cache = QuoteCache::try_load(&path).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.purge_unresolved(), 1);
        assert!(cache.get("US0000000002").is_none());
    }
}
