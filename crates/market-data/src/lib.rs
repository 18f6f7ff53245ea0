//! Lotwise Market Data Crate
//!
//! This crate turns a security identifier into a price in a target currency,
//! with a local cache in front of the quote source.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Symbol resolution from a user-maintained override table and name rules
//! - A pluggable, blocking quote source (Yahoo Finance chart API included)
//! - A 24 hour quote and exchange rate cache with explicit invalidation
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  Valuation pass  | --> |   QuoteService   |  (one session per run)
//! +------------------+     +------------------+
//!                             |            |
//!                             v            v
//!                  +---------------+  +------------------+
//!                  | ResolverChain |  |    QuoteCache    |  (JSON file)
//!                  +---------------+  +------------------+
//!                             |
//!                             v
//!                  +------------------+
//!                  |   QuoteSource    |  (Yahoo, test doubles)
//!                  +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteService`] - Resolve, reuse or fetch, convert, store
//! - [`QuoteCacheEntry`] - Cached lookup result with its [`FetchStatus`]
//! - [`OverrideTable`] - `ISIN,NAME,TICKER` mappings
//! - [`QuoteSource`] - Capability to fetch a quote or an exchange rate

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

pub use errors::MarketDataError;

// Re-export all public types from models
pub use models::{
    fx_pair_key, Currency, FetchStatus, FetchedQuote, FxCacheEntry, ProviderId, QuoteCacheEntry,
    QuoteSymbol, SecurityId,
};

// Re-export cache types
pub use cache::{QuoteCache, QuoteOptions, QuoteService, DEFAULT_CACHE_VALIDITY_HOURS};

// Re-export resolver types
pub use resolver::{
    symbol_from_name, OverrideRow, OverrideTable, ResolutionSource, ResolvedSymbol, Resolver,
    ResolverChain, RulesResolver,
};

// Re-export provider types
pub use provider::yahoo::YahooProvider;
pub use provider::QuoteSource;
