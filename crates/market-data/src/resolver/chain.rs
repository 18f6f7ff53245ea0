//! Resolver chain - composite resolver that tries resolvers in order.
//!
//! The resolver chain is the main entry point for symbol resolution. It
//! consults the override table first, then the name rules. A miss is
//! registered in the override table.

use tracing::warn;

use super::override_table::OverrideTable;
use super::rules_resolver::RulesResolver;
use super::traits::{ResolvedSymbol, Resolver};

/// Composite resolver that tries multiple resolvers in order.
///
/// The resolution order is:
/// 1. Override table (non-empty `TICKER` for the identifier)
/// 2. Name rules (US identifiers only)
///
/// # Example
///
/// ```ignore
/// let chain = ResolverChain::new();
/// let mut overrides = OverrideTable::new();
///
/// let resolved = chain.resolve(&mut overrides, "US4581401001", "INTEL CORP");
/// // resolved.symbol = "INTEL", resolved.source = ResolutionSource::Rules
///
/// let missing = chain.resolve(&mut overrides, "NL0000000001", "SOME FUND");
/// // missing = None, and overrides now has a pending row for NL0000000001
/// ```
pub struct ResolverChain {
    rules_resolver: RulesResolver,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self {
            rules_resolver: RulesResolver::new(),
        }
    }

    /// Resolve a symbol, registering the security in `overrides` on a miss.
    pub fn resolve(
        &self,
        overrides: &mut OverrideTable,
        security_id: &str,
        display_name: &str,
    ) -> Option<ResolvedSymbol> {
        if let Some(resolved) = Resolver::resolve(&*overrides, security_id, display_name) {
            return Some(resolved);
        }

        if let Some(resolved) = self.rules_resolver.resolve(security_id, display_name) {
            return Some(resolved);
        }

        if overrides.ensure_entry(security_id, display_name) {
            warn!(
                "No ticker for {} ({}); added to override table for manual mapping",
                display_name, security_id
            );
        }
        None
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::traits::ResolutionSource;

    #[test]
    fn test_chain_with_override() {
        let chain = ResolverChain::new();
        let mut overrides = OverrideTable::new();
        overrides.set_symbol("US4581401001", "INTEL CORP", "INTC");

        let resolved = chain
            .resolve(&mut overrides, "US4581401001", "INTEL CORP")
            .unwrap();

        // Should use override, not rules
        assert_eq!(resolved.source, ResolutionSource::Override);
        assert_eq!(resolved.symbol, "INTC");
    }

    #[test]
    fn test_chain_falls_through_to_rules() {
        let chain = ResolverChain::new();
        let mut overrides = OverrideTable::new();

        let resolved = chain
            .resolve(&mut overrides, "US4581401001", "INTEL CORP")
            .unwrap();

        assert_eq!(resolved.source, ResolutionSource::Rules);
        assert_eq!(resolved.symbol, "INTEL");
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_pending_override_does_not_block_rules() {
        let chain = ResolverChain::new();
        let mut overrides = OverrideTable::new();
        overrides.ensure_entry("US4581401001", "INTEL CORP");

        let resolved = chain
            .resolve(&mut overrides, "US4581401001", "INTEL CORP")
            .unwrap();
        assert_eq!(resolved.source, ResolutionSource::Rules);
    }

    #[test]
    fn test_non_us_identifier_without_override_is_unresolved() {
        let chain = ResolverChain::new();
        let mut overrides = OverrideTable::new();

        assert!(chain
            .resolve(&mut overrides, "DE0007164600", "SAP")
            .is_none());
        assert!(overrides.contains("DE0007164600"));
    }

    #[test]
    fn test_unresolved_appends_once() {
        let chain = ResolverChain::new();
        let mut overrides = OverrideTable::new();

        assert!(chain
            .resolve(&mut overrides, "NL0000000001", "SOME FUND")
            .is_none());
        assert!(chain
            .resolve(&mut overrides, "NL0000000001", "SOME FUND")
            .is_none());

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.pending().count(), 1);
    }
}
