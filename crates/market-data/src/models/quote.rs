use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Currency, QuoteSymbol};

/// Price returned by a quote source for a single symbol
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedQuote {
    /// Latest traded price in the quote's native currency
    pub price: Decimal,

    /// Native currency, when the source reports one
    pub currency: Option<Currency>,
}

impl FetchedQuote {
    pub fn new(price: Decimal, currency: impl Into<Currency>) -> Self {
        Self {
            price,
            currency: Some(currency.into()),
        }
    }
}

/// Outcome of a price lookup for one security.
///
/// Stored on every [`QuoteCacheEntry`]. Older cache files used the
/// `ticker_not_found` / `api_error` / `currency_error` spellings, which are
/// still accepted when reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// Price fetched and expressed in the target currency.
    Success,
    /// No quote symbol could be determined. Never persisted.
    #[serde(alias = "ticker_not_found")]
    SymbolUnresolved,
    /// The source had no price for the resolved symbol.
    #[serde(alias = "api_error")]
    SourceError,
    /// A native price exists but no exchange rate to the target currency.
    #[serde(alias = "currency_error")]
    ConversionError,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Success => "success",
            FetchStatus::SymbolUnresolved => "symbol_unresolved",
            FetchStatus::SourceError => "source_error",
            FetchStatus::ConversionError => "conversion_error",
        }
    }

    /// Human readable reason, used by reports.
    pub fn describe(&self) -> &'static str {
        match self {
            FetchStatus::Success => "Price available",
            FetchStatus::SymbolUnresolved => "Ticker not found",
            FetchStatus::SourceError => "Price unavailable from source",
            FetchStatus::ConversionError => "Currency conversion failed",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached price lookup for one security.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteCacheEntry {
    /// Symbol the price was fetched under
    pub resolved_symbol: Option<QuoteSymbol>,

    /// Price in the quote's own currency
    pub native_price: Option<Decimal>,

    /// Currency of `native_price`
    pub native_currency: Option<Currency>,

    /// Price converted to the target currency
    pub target_price: Option<Decimal>,

    pub status: FetchStatus,

    pub fetched_at: DateTime<Utc>,
}

impl QuoteCacheEntry {
    /// Entry for a security no symbol could be found for.
    pub fn unresolved(now: DateTime<Utc>) -> Self {
        Self {
            resolved_symbol: None,
            native_price: None,
            native_currency: None,
            target_price: None,
            status: FetchStatus::SymbolUnresolved,
            fetched_at: now,
        }
    }

    /// Entry for a symbol the source returned nothing for.
    pub fn source_error(symbol: impl Into<QuoteSymbol>, now: DateTime<Utc>) -> Self {
        Self {
            resolved_symbol: Some(symbol.into()),
            native_price: None,
            native_currency: None,
            target_price: None,
            status: FetchStatus::SourceError,
            fetched_at: now,
        }
    }

    /// Entry with a native price that could not be converted.
    pub fn conversion_error(
        symbol: impl Into<QuoteSymbol>,
        native_price: Decimal,
        native_currency: impl Into<Currency>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            resolved_symbol: Some(symbol.into()),
            native_price: Some(native_price),
            native_currency: Some(native_currency.into()),
            target_price: None,
            status: FetchStatus::ConversionError,
            fetched_at: now,
        }
    }

    /// Entry with a price in the target currency.
    pub fn success(
        symbol: impl Into<QuoteSymbol>,
        native_price: Decimal,
        native_currency: impl Into<Currency>,
        target_price: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            resolved_symbol: Some(symbol.into()),
            native_price: Some(native_price),
            native_currency: Some(native_currency.into()),
            target_price: Some(target_price),
            status: FetchStatus::Success,
            fetched_at: now,
        }
    }

    /// True while the entry is younger than `validity`.
    ///
    /// An entry exactly `validity` old is stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, validity: Duration) -> bool {
        now - self.fetched_at < validity
    }

    pub fn is_unresolved(&self) -> bool {
        self.status == FetchStatus::SymbolUnresolved
    }
}
