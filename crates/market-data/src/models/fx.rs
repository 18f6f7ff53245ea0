use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cached exchange rate for one currency pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FxCacheEntry {
    /// Units of the quote currency per unit of the base currency
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl FxCacheEntry {
    pub fn new(rate: Decimal, fetched_at: DateTime<Utc>) -> Self {
        Self { rate, fetched_at }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, validity: Duration) -> bool {
        now - self.fetched_at < validity
    }
}
