use std::collections::BTreeMap;

use log::info;
use rust_decimal::Decimal;

use lotwise_market_data::{FetchStatus, QuoteCacheEntry, QuoteService};

use super::valuation_model::{NotPriced, ValuationSummary, ValuedPosition};
use crate::aging::AgedPosition;
use crate::ledger::OpenPosition;
use crate::transactions::SecurityKey;

/// Where the valuation pass gets price information from.
pub trait PriceLookup {
    fn price_info(&mut self, security_id: &str, display_name: &str) -> QuoteCacheEntry;
}

impl PriceLookup for QuoteService<'_> {
    fn price_info(&mut self, security_id: &str, display_name: &str) -> QuoteCacheEntry {
        self.get_or_fetch(security_id, display_name)
    }
}

/// `target_price × quantity`, or `None` when there is no target price.
pub fn position_value(price_info: Option<&QuoteCacheEntry>, quantity: Decimal) -> Option<Decimal> {
    price_info
        .and_then(|info| info.target_price)
        .map(|price| price * quantity)
}

/// Look up a price for every position holding shares and value it.
///
/// Closed positions are passed through without a lookup.
pub fn value_positions(
    positions: Vec<OpenPosition>,
    lookup: &mut dyn PriceLookup,
) -> Vec<ValuedPosition> {
    let mut attempted = 0usize;
    let mut succeeded = 0usize;

    let valued: Vec<ValuedPosition> = positions
        .into_iter()
        .map(|position| {
            if position.total_quantity.is_zero() {
                return ValuedPosition::unpriced(position);
            }
            attempted += 1;
            let info = lookup.price_info(&position.key.security_id, &position.key.display_name);
            if info.status == FetchStatus::Success {
                succeeded += 1;
            }
            let value = position_value(Some(&info), position.total_quantity);
            ValuedPosition {
                position,
                price_info: Some(info),
                value,
            }
        })
        .collect();

    info!("Price fetch complete: {}/{} successful", succeeded, attempted);
    valued
}

/// Value the qualifying quantity of each aged position from its carried price.
pub fn value_aged(aged: &mut [AgedPosition]) {
    for position in aged.iter_mut() {
        position.aged_value = position_value(position.price_info.as_ref(), position.qualifying_total);
    }
}

/// Sum the values that exist and count the ones that do not.
pub fn summarize<I>(values: I) -> ValuationSummary
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    values
        .into_iter()
        .fold(ValuationSummary::default(), |mut summary, value| {
            match value {
                Some(value) => {
                    summary.total_value += value;
                    summary.priced += 1;
                }
                None => summary.unpriced += 1,
            }
            summary
        })
}

/// Group securities without a target price by the reason.
///
/// Securities nobody looked a price up for are left out.
pub fn group_not_priced<'a, I>(items: I) -> BTreeMap<FetchStatus, Vec<NotPriced>>
where
    I: IntoIterator<Item = (&'a SecurityKey, Option<&'a QuoteCacheEntry>)>,
{
    let mut groups: BTreeMap<FetchStatus, Vec<NotPriced>> = BTreeMap::new();
    for (key, info) in items {
        let Some(info) = info else { continue };
        if info.status == FetchStatus::Success {
            continue;
        }
        groups.entry(info.status).or_default().push(NotPriced {
            key: key.clone(),
            symbol: info.resolved_symbol.clone(),
            native_currency: info.native_currency.clone(),
        });
    }
    for entries in groups.values_mut() {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
    }
    groups
}
