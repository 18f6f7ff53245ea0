//! Quote caching and the cache-aware quote service.
//!
//! ```text
//!   get_or_fetch(id, name)
//!          │
//!          ▼
//!   ResolverChain ──miss──► pending override row, unresolved entry (not stored)
//!          │ symbol
//!          ▼
//!   QuoteCache hit? ──fresh, same symbol, caching on──► cached entry
//!          │ no
//!          ▼
//!   QuoteSource::fetch_quote ──► target currency? ──► FX (cached or fetched)
//!          │
//!          ▼
//!   entry stored with success / source_error / conversion_error
//! ```

mod service;
mod store;


pub use service::{QuoteOptions, QuoteService, DEFAULT_CACHE_VALIDITY_HOURS};
pub use store::{QuoteCache, CACHE_FORMAT_VERSION};
