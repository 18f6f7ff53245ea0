//! Holding-period filter.
//!
//! Keeps the lots that have been held at least a threshold number of
//! years, counted in fixed 365.25-day years. The boundary is inclusive.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lotwise_market_data::QuoteCacheEntry;

use crate::constants::DAYS_PER_YEAR;
use crate::transactions::SecurityKey;
use crate::valuation::ValuedPosition;

/// A lot old enough to qualify, with how long it has been held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgedLot {
    pub opened_date: NaiveDate,
    pub quantity: Decimal,
    pub holding_days: i64,
    pub holding_years: f64,
}

/// The qualifying part of one security's holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgedPosition {
    pub key: SecurityKey,
    pub lots: Vec<AgedLot>,
    pub qualifying_total: Decimal,
    /// Everything still held, qualifying or not
    pub held_total: Decimal,
    /// Carried over unchanged from the valued position
    pub price_info: Option<QuoteCacheEntry>,
    /// Value of `qualifying_total`; filled in by the valuation pass
    pub aged_value: Option<Decimal>,
}

#[derive(Debug, Clone, Copy)]
pub struct AgingFilter {
    threshold_years: f64,
    as_of: NaiveDate,
}

impl AgingFilter {
    pub fn new(threshold_years: f64, as_of: NaiveDate) -> Self {
        Self {
            threshold_years,
            as_of,
        }
    }

    /// Minimum holding period in days (may be fractional).
    pub fn threshold_days(&self) -> f64 {
        self.threshold_years * DAYS_PER_YEAR
    }

    pub fn holding_days(&self, opened_date: NaiveDate) -> i64 {
        (self.as_of - opened_date).num_days()
    }

    pub fn qualifies(&self, opened_date: NaiveDate) -> bool {
        let days = self.holding_days(opened_date);
        days >= 0 && days as f64 >= self.threshold_days()
    }

    /// Qualifying lots per security. Securities without any are omitted.
    pub fn filter(&self, positions: &[ValuedPosition]) -> Vec<AgedPosition> {
        positions
            .iter()
            .filter_map(|valued| {
                let position = &valued.position;
                let lots: Vec<AgedLot> = position
                    .lots
                    .iter()
                    .filter(|lot| self.qualifies(lot.opened_date))
                    .map(|lot| {
                        let holding_days = self.holding_days(lot.opened_date);
                        AgedLot {
                            opened_date: lot.opened_date,
                            quantity: lot.remaining_quantity,
                            holding_days,
                            holding_years: holding_days as f64 / DAYS_PER_YEAR,
                        }
                    })
                    .collect();

                if lots.is_empty() {
                    return None;
                }
                Some(AgedPosition {
                    key: position.key.clone(),
                    qualifying_total: lots.iter().map(|lot| lot.quantity).sum(),
                    held_total: position.total_quantity,
                    lots,
                    price_info: valued.price_info.clone(),
                    aged_value: None,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::ledger::{Lot, OpenPosition};
    use crate::valuation::value_aged;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valued(name: &str, lots: Vec<Lot>) -> ValuedPosition {
        let total = lots.iter().map(|l| l.remaining_quantity).sum();
        ValuedPosition::unpriced(OpenPosition {
            key: SecurityKey::new(name, format!("{}-ID", name)),
            lots,
            total_quantity: total,
        })
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let as_of = date(2024, 6, 1);
        // 4 years = 1461 days exactly
        let filter = AgingFilter::new(4.0, as_of);
        let on_boundary = as_of - Duration::days(1461);
        let day_short = on_boundary + Duration::days(1);

        assert!(filter.qualifies(on_boundary));
        assert!(!filter.qualifies(day_short));
    }

    #[test]
    fn test_fractional_threshold_rounds_up_to_whole_days() {
        let as_of = date(2024, 6, 1);
        // 3 years = 1095.75 days, so 1095 days is not enough
        let filter = AgingFilter::new(3.0, as_of);
        assert!(!filter.qualifies(as_of - Duration::days(1095)));
        assert!(filter.qualifies(as_of - Duration::days(1096)));
    }

    #[test]
    fn test_future_lot_never_qualifies() {
        let filter = AgingFilter::new(0.0001, date(2024, 1, 1));
        assert!(!filter.qualifies(date(2024, 1, 2)));
    }

    #[test]
    fn test_filter_keeps_only_qualifying_lots() {
        let filter = AgingFilter::new(3.0, date(2024, 1, 1));
        let positions = vec![
            valued(
                "OLD",
                vec![
                    Lot::new(date(2019, 5, 1), dec!(4)),
                    Lot::new(date(2020, 3, 1), dec!(2)),
                    Lot::new(date(2023, 1, 1), dec!(10)),
                ],
            ),
            valued("NEW", vec![Lot::new(date(2022, 1, 1), dec!(7))]),
        ];

        let aged = filter.filter(&positions);

        assert_eq!(aged.len(), 1);
        let old = &aged[0];
        assert_eq!(old.key.display_name, "OLD");
        assert_eq!(old.lots.len(), 2);
        assert_eq!(old.qualifying_total, dec!(6));
        assert_eq!(old.held_total, dec!(16));
        assert_eq!(old.lots[0].holding_days, 1706);
        assert!((old.lots[0].holding_years - 1706.0 / 365.25).abs() < 1e-9);
    }

    #[test]
    fn test_price_info_carried_and_valued_on_qualifying_quantity() {
        let filter = AgingFilter::new(3.0, date(2024, 1, 1));
        let mut position = valued(
            "OLD",
            vec![
                Lot::new(date(2019, 5, 1), dec!(4)),
                Lot::new(date(2023, 5, 1), dec!(6)),
            ],
        );
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let info = QuoteCacheEntry::success("OLD", dec!(25), "EUR", dec!(25), now);
        position.price_info = Some(info.clone());
        position.value = Some(dec!(250));

        let mut aged = filter.filter(&[position]);
        value_aged(&mut aged);

        assert_eq!(aged[0].price_info, Some(info));
        assert_eq!(aged[0].aged_value, Some(dec!(100)));
    }
}
