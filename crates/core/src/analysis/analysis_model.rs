use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use lotwise_market_data::FetchStatus;

use crate::aging::AgedPosition;
use crate::ledger::{DisposalRecord, OversellAnomaly};
use crate::transactions::SecurityKey;
use crate::valuation::{group_not_priced, NotPriced, ValuationSummary, ValuedPosition};

/// Everything one analysis run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub target_currency: String,
    /// Every security ever acquired, ordered by name. Closed ones have a
    /// zero total and no price information.
    pub positions: Vec<ValuedPosition>,
    /// Matched disposals per security, present when tracking was requested
    pub disposals: Option<BTreeMap<SecurityKey, Vec<DisposalRecord>>>,
    pub anomalies: Vec<OversellAnomaly>,
    /// Qualifying lots, present when the aged view was requested
    pub aged: Option<Vec<AgedPosition>>,
    /// Totals over open positions, present when prices were looked up
    pub summary: Option<ValuationSummary>,
    /// Totals over the aged view, present when both were requested
    pub aged_summary: Option<ValuationSummary>,
    pub threshold_years: f64,
    pub as_of_date: NaiveDate,
    pub valuation_time: DateTime<Utc>,
}

impl PortfolioAnalysis {
    pub fn prices_fetched(&self) -> bool {
        self.summary.is_some()
    }

    /// Positions that still hold shares.
    pub fn open_positions(&self) -> impl Iterator<Item = &ValuedPosition> {
        self.positions
            .iter()
            .filter(|valued| !valued.position.is_closed())
    }

    /// Securities that were fully disposed of.
    pub fn closed_securities(&self) -> impl Iterator<Item = &SecurityKey> {
        self.positions
            .iter()
            .filter(|valued| valued.position.is_closed())
            .map(|valued| valued.key())
    }

    /// Open positions without a value, grouped by why.
    pub fn not_priced(&self) -> BTreeMap<FetchStatus, Vec<NotPriced>> {
        group_not_priced(
            self.open_positions()
                .map(|valued| (valued.key(), valued.price_info.as_ref())),
        )
    }

    /// Aged positions without a value, grouped by why.
    pub fn aged_not_priced(&self) -> BTreeMap<FetchStatus, Vec<NotPriced>> {
        match &self.aged {
            Some(aged) => group_not_priced(
                aged.iter()
                    .map(|position| (&position.key, position.price_info.as_ref())),
            ),
            None => BTreeMap::new(),
        }
    }
}
