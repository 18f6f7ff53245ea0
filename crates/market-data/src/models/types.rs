/// Source identifier, e.g. "YAHOO"
pub type ProviderId = &'static str;

/// Currency code (ISO 4217)
pub type Currency = String;

/// Opaque security identifier (ISIN for broker exports)
pub type SecurityId = String;

/// Quote symbol understood by a source, e.g. "AAPL" or "ASML.AS"
pub type QuoteSymbol = String;

/// Cache key for an exchange rate, e.g. "USDEUR".
pub fn fx_pair_key(from: &str, to: &str) -> String {
    format!("{}{}", from, to)
}
