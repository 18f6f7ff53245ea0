//! Quote service - cache-aware price lookup for one valuation session.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::models::{Currency, FetchedQuote, FxCacheEntry, QuoteCacheEntry};
use crate::provider::QuoteSource;
use crate::resolver::{OverrideTable, ResolverChain};

use super::store::QuoteCache;

/// Default lifetime of cached quotes and exchange rates.
pub const DEFAULT_CACHE_VALIDITY_HOURS: i64 = 24;

/// Settings for a quote service session.
#[derive(Clone, Debug)]
pub struct QuoteOptions {
    /// Currency every price is converted into
    pub target_currency: Currency,
    /// When false, cached quotes and rates are never reused
    pub use_cache: bool,
    /// Entries at least this old are refetched
    pub validity: Duration,
    /// Clock reading used for every freshness check and new entry
    pub now: DateTime<Utc>,
}

/// Resolves, fetches and caches prices one security at a time.
///
/// The service owns the cache and the override table for the length of a
/// session; [`into_parts`](Self::into_parts) hands both back for saving.
pub struct QuoteService<'a> {
    source: &'a dyn QuoteSource,
    resolver: ResolverChain,
    cache: QuoteCache,
    overrides: OverrideTable,
    options: QuoteOptions,
}

impl<'a> QuoteService<'a> {
    /// Start a session. Unresolved entries left in `cache` are purged here,
    /// before anything is fetched.
    pub fn new(
        source: &'a dyn QuoteSource,
        mut cache: QuoteCache,
        overrides: OverrideTable,
        options: QuoteOptions,
    ) -> Self {
        let purged = cache.purge_unresolved();
        if purged > 0 {
            info!("Removed {} unresolved entries from quote cache", purged);
        }
        Self {
            source,
            resolver: ResolverChain::new(),
            cache,
            overrides,
            options,
        }
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    /// End the session, returning the cache and override table.
    pub fn into_parts(self) -> (QuoteCache, OverrideTable) {
        (self.cache, self.overrides)
    }

    /// Price lookup for one security.
    ///
    /// Resolution always runs first. A cached entry is reused only when
    /// caching is on, it was resolved, its symbol matches the one just
    /// resolved and it is younger than the validity window. Unresolved
    /// results are returned but never stored.
    pub fn get_or_fetch(&mut self, security_id: &str, display_name: &str) -> QuoteCacheEntry {
        let now = self.options.now;
        let resolved = self
            .resolver
            .resolve(&mut self.overrides, security_id, display_name);

        if let Some(cached) = self.cache.get(security_id) {
            if let Some(symbol) = resolved.as_ref().map(|r| r.symbol.as_str()) {
                if self.is_reusable(cached, symbol) {
                    debug!("Using cached price for {} ({})", display_name, symbol);
                    return cached.clone();
                }
            }
        }

        let Some(resolved) = resolved else {
            return QuoteCacheEntry::unresolved(now);
        };
        let symbol = resolved.symbol;

        let entry = match self.source.fetch_quote(&symbol) {
            Ok(quote) => self.to_target_currency(&symbol, quote),
            Err(e) => {
                warn!(
                    "No price for {} ({}) from {}: {}",
                    display_name,
                    symbol,
                    self.source.id(),
                    e
                );
                QuoteCacheEntry::source_error(symbol, now)
            }
        };

        self.cache.insert(security_id, entry.clone());
        entry
    }

    fn is_reusable(&self, cached: &QuoteCacheEntry, symbol: &str) -> bool {
        self.options.use_cache
            && !cached.is_unresolved()
            && cached.resolved_symbol.as_deref() == Some(symbol)
            && cached.is_fresh(self.options.now, self.options.validity)
    }

    fn to_target_currency(&mut self, symbol: &str, quote: FetchedQuote) -> QuoteCacheEntry {
        let now = self.options.now;
        let target = self.options.target_currency.clone();
        let currency = quote.currency.unwrap_or_else(|| target.clone());

        if currency.eq_ignore_ascii_case(&target) {
            return QuoteCacheEntry::success(symbol, quote.price, currency, quote.price, now);
        }

        match self.fx_rate(&currency, &target) {
            Some(rate) => {
                QuoteCacheEntry::success(symbol, quote.price, currency, quote.price * rate, now)
            }
            None => QuoteCacheEntry::conversion_error(symbol, quote.price, currency, now),
        }
    }

    /// Exchange rate, from the cache when allowed and fresh, else the source.
    fn fx_rate(&mut self, from: &str, to: &str) -> Option<Decimal> {
        let now = self.options.now;
        if self.options.use_cache {
            if let Some(cached) = self.cache.fx_rate(from, to) {
                if cached.is_fresh(now, self.options.validity) {
                    debug!("Using cached {}/{} rate {}", from, to, cached.rate);
                    return Some(cached.rate);
                }
            }
        }

        match self.source.fetch_fx_rate(from, to) {
            Ok(rate) if rate > Decimal::ZERO => {
                self.cache.insert_fx_rate(from, to, FxCacheEntry::new(rate, now));
                Some(rate)
            }
            Ok(rate) => {
                warn!("Ignoring non-positive {}/{} rate {}", from, to, rate);
                None
            }
            Err(e) => {
                warn!("No {}/{} rate from {}: {}", from, to, self.source.id(), e);
                None
            }
        }
    }
}
