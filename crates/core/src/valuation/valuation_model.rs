use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lotwise_market_data::{FetchStatus, QuoteCacheEntry};

use crate::ledger::OpenPosition;
use crate::transactions::SecurityKey;

/// An open position with whatever price information was found for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedPosition {
    pub position: OpenPosition,
    /// Absent when prices were not requested or the position is closed
    pub price_info: Option<QuoteCacheEntry>,
    /// Target-currency value of the whole position; absent without a price
    pub value: Option<Decimal>,
}

impl ValuedPosition {
    /// A position nobody looked a price up for.
    pub fn unpriced(position: OpenPosition) -> Self {
        Self {
            position,
            price_info: None,
            value: None,
        }
    }

    pub fn key(&self) -> &SecurityKey {
        &self.position.key
    }

    pub fn status(&self) -> Option<FetchStatus> {
        self.price_info.as_ref().map(|info| info.status)
    }
}

/// Totals over a set of positions.
///
/// Positions without a value are counted in `unpriced` and left out of
/// `total_value`, never added as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub total_value: Decimal,
    pub priced: usize,
    pub unpriced: usize,
}

impl ValuationSummary {
    pub fn securities(&self) -> usize {
        self.priced + self.unpriced
    }
}

/// A security that ended up without a value, for the "not priced" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotPriced {
    pub key: SecurityKey,
    pub symbol: Option<String>,
    pub native_currency: Option<String>,
}
