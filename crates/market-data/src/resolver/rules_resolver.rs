//! Rules resolver - best-effort symbol extraction from product names.
//!
//! US listings in broker exports are usually named after the company
//! ("INTEL CORP", "Visa Inc"), and for short single-word names the company
//! name is often the ticker. This resolver strips the corporate suffix and
//! accepts what is left only when it looks like a ticker.
//!
//! False positives are possible ("APPLE INC" yields `APPLE`, not `AAPL`);
//! an override table entry always wins over this resolver.

use super::traits::{ResolutionSource, ResolvedSymbol, Resolver};

/// ISIN country prefix the heuristic applies to.
const US_ISIN_PREFIX: &str = "US";

/// Suffixes stripped from the upper-cased name, in this order.
const CORPORATE_SUFFIXES: &[&str] = &[
    " INC",
    " CORP",
    " CORPORATION",
    " LTD",
    " LIMITED",
    " PLC",
    " NV",
];

/// Longest remainder still accepted as a ticker.
const MAX_SYMBOL_LEN: usize = 5;

/// Resolves symbols from display names of US securities.
#[derive(Debug, Default, Clone)]
pub struct RulesResolver;

impl RulesResolver {
    pub fn new() -> Self {
        Self
    }

    /// Whether the identifier belongs to a numbering scheme the rules know.
    pub fn applies_to(security_id: &str) -> bool {
        security_id.starts_with(US_ISIN_PREFIX)
    }
}

impl Resolver for RulesResolver {
    fn resolve(&self, security_id: &str, display_name: &str) -> Option<ResolvedSymbol> {
        if !Self::applies_to(security_id) {
            return None;
        }
        symbol_from_name(display_name).map(|symbol| ResolvedSymbol::new(symbol, ResolutionSource::Rules))
    }
}

/// Extract a ticker-like token from a company name.
pub fn symbol_from_name(display_name: &str) -> Option<String> {
    let mut name = display_name.trim().to_uppercase();
    for suffix in CORPORATE_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.trim().to_string();
        }
    }

    let mut words = name.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None) if word.chars().count() <= MAX_SYMBOL_LEN => Some(word.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_corporate_suffix() {
        assert_eq!(symbol_from_name("Intel Corp"), Some("INTEL".to_string()));
        assert_eq!(symbol_from_name("VISA INC"), Some("VISA".to_string()));
        assert_eq!(symbol_from_name("Unity Ltd"), Some("UNITY".to_string()));
    }

    #[test]
    fn test_strips_suffixes_in_sequence() {
        assert_eq!(symbol_from_name("ACME NV INC"), Some("ACME".to_string()));
        // Each suffix is only checked once, in list order.
        assert_eq!(symbol_from_name("ACME INC NV"), None);
    }

    #[test]
    fn test_rejects_long_or_multi_word_names() {
        assert_eq!(symbol_from_name("NVIDIA CORP"), None);
        assert_eq!(symbol_from_name("META PLATFORMS INC"), None);
        assert_eq!(symbol_from_name(" INC"), None);
        assert_eq!(symbol_from_name(""), None);
    }

    #[test]
    fn test_only_us_identifiers() {
        let resolver = RulesResolver::new();
        assert_eq!(
            resolver.resolve("US4581401001", "INTEL CORP"),
            Some(ResolvedSymbol::new("INTEL", ResolutionSource::Rules))
        );
        assert_eq!(resolver.resolve("NL0010273215", "ASML"), None);
    }

    #[test]
    fn test_short_name_without_suffix() {
        let resolver = RulesResolver::new();
        let resolved = resolver.resolve("US0000000001", "ibm").unwrap();
        assert_eq!(resolved.symbol, "IBM");
    }
}
