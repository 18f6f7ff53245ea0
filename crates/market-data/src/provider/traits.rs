//! Quote source trait definition.

use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{FetchedQuote, ProviderId};

/// A place latest prices and exchange rates can be fetched from.
///
/// Calls are blocking and made one at a time. Timeouts are the
/// implementation's concern; an `Err` from either method is recorded as a
/// per-security status by the quote service and never aborts a run.
///
/// # Example
///
/// ```ignore
/// use lotwise_market_data::{FetchedQuote, MarketDataError, QuoteSource};
///
/// struct FixedSource;
///
/// impl QuoteSource for FixedSource {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     fn fetch_quote(&self, _symbol: &str) -> Result<FetchedQuote, MarketDataError> {
///         Ok(FetchedQuote::new(dec!(100), "EUR"))
///     }
///
///     fn fetch_fx_rate(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError> {
///         Err(MarketDataError::NoPriceData(format!("{from}{to}")))
///     }
/// }
/// ```
pub trait QuoteSource: Send + Sync {
    /// Unique identifier for this source, used in logs.
    fn id(&self) -> ProviderId;

    /// Fetch the latest price for a symbol.
    fn fetch_quote(&self, symbol: &str) -> Result<FetchedQuote, MarketDataError>;

    /// Fetch the rate converting one unit of `from` into `to`.
    fn fetch_fx_rate(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError>;
}
