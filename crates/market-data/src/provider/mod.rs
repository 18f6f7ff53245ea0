//! Quote source abstraction and implementations.
//!
//! This module contains:
//! - The `QuoteSource` trait the quote service fetches through
//! - Concrete sources (Yahoo Finance chart API)
//!
//! Sources receive an already resolved symbol. Mapping a security
//! identifier to a symbol happens in the resolver module, and deciding
//! whether a fetch is needed at all happens in the cache module.

mod traits;

pub mod yahoo;

// Re-exports
pub use traits::QuoteSource;
