//! Resolution traits for the market data crate.
//!
//! Defines the core abstractions for mapping a security identifier to a
//! symbol a quote source understands.

use crate::models::QuoteSymbol;

/// Resolution result containing the symbol and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub symbol: QuoteSymbol,
    pub source: ResolutionSource,
}

impl ResolvedSymbol {
    pub fn new(symbol: impl Into<QuoteSymbol>, source: ResolutionSource) -> Self {
        Self {
            symbol: symbol.into(),
            source,
        }
    }
}

/// Indicates how a symbol was resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionSource {
    /// From the override table - user-maintained mapping.
    Override,
    /// From the display-name heuristic.
    Rules,
}

/// Individual resolver in the resolution chain.
///
/// Resolvers are tried in order until one returns a result.
/// Returning `None` means this resolver cannot handle the security,
/// and the chain should try the next resolver.
pub trait Resolver: Send + Sync {
    /// Attempt to resolve a quote symbol.
    ///
    /// # Arguments
    /// * `security_id` - Opaque identifier, typically an ISIN
    /// * `display_name` - Product name as it appears in the transaction feed
    fn resolve(&self, security_id: &str, display_name: &str) -> Option<ResolvedSymbol>;
}
