//! Market data models
//!
//! This module contains the core data types for quote caching:
//! - `types` - Type aliases for common identifiers (SecurityId, Currency, QuoteSymbol)
//! - `quote` - What a source returns (FetchedQuote) and what the cache keeps (QuoteCacheEntry)
//! - `fx` - Cached exchange rates (FxCacheEntry)

mod fx;
mod quote;
mod types;

pub use fx::FxCacheEntry;
pub use quote::{FetchStatus, FetchedQuote, QuoteCacheEntry};
pub use types::{fx_pair_key, Currency, ProviderId, QuoteSymbol, SecurityId};
