//! Property-based integration tests for the FIFO ledger and the aging filter.
//!
//! These tests verify that lot accounting holds across arbitrary
//! transaction streams, using the `proptest` crate for random test case
//! generation.

use chrono::{Duration, NaiveDate};
use lotwise_core::aging::AgingFilter;
use lotwise_core::ledger::FifoLedger;
use lotwise_core::transactions::{SecurityKey, Transaction};
use proptest::prelude::*;
use rust_decimal::Decimal;

const SECURITIES: [(&str, &str); 3] = [
    ("US0000000001", "ACME"),
    ("NL0000000002", "BOLT"),
    ("IE0000000003", "CORE WORLD"),
];

// =============================================================================
// Generators
// =============================================================================

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
}

/// Generates a non-zero quantity with up to two decimals.
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    prop_oneof![1i64..5_000, -5_000i64..=-1].prop_map(|cents| Decimal::new(cents, 2))
}

/// Generates a transaction for one of a few securities within ten years.
fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (0usize..SECURITIES.len(), 0i64..3_650, arb_quantity()).prop_map(|(index, offset, quantity)| {
        let (id, name) = SECURITIES[index];
        Transaction::new(base_date() + Duration::days(offset), id, name, quantity)
    })
}

fn arb_transactions(max_count: usize) -> impl Strategy<Value = Vec<Transaction>> {
    proptest::collection::vec(arb_transaction(), 0..=max_count)
}

fn key_for(id: &str) -> SecurityKey {
    let (_, name) = SECURITIES
        .iter()
        .find(|(security_id, _)| *security_id == id)
        .unwrap();
    SecurityKey::new(*name, id)
}

/// Acquisitions of one security in the order the ledger replays them.
fn replayed_acquisitions(transactions: &[Transaction], id: &str) -> Vec<(NaiveDate, Decimal)> {
    let mut acquisitions: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.security_id == id && t.is_acquisition())
        .collect();
    acquisitions.sort_by_key(|t| t.date);
    acquisitions.iter().map(|t| (t.date, t.quantity)).collect()
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// **Property 1: Lot conservation**
    ///
    /// Acquired minus matched equals what is still open, and requested minus
    /// matched equals the oversell shortfall.
    #[test]
    fn prop_lot_conservation(transactions in arb_transactions(60)) {
        let outcome = FifoLedger::new()
            .with_disposal_tracking(true)
            .apply(&transactions);

        for (id, _) in SECURITIES {
            let key = key_for(id);
            let acquired: Decimal = transactions
                .iter()
                .filter(|t| t.security_id == id && t.is_acquisition())
                .map(|t| t.quantity)
                .sum();
            let requested: Decimal = transactions
                .iter()
                .filter(|t| t.security_id == id && t.is_disposal())
                .map(|t| t.quantity.abs())
                .sum();
            let matched: Decimal = outcome
                .disposals
                .get(&key)
                .map(|records| records.iter().map(|r| r.quantity).sum())
                .unwrap_or_default();
            let open: Decimal = outcome
                .open_lots
                .get(&key)
                .map(|lots| lots.iter().map(|l| l.remaining_quantity).sum())
                .unwrap_or_default();
            let shortfall: Decimal = outcome
                .anomalies
                .iter()
                .filter(|a| a.key == key)
                .map(|a| a.unresolved_quantity)
                .sum();

            prop_assert_eq!(acquired - matched, open, "open quantity for {}", id);
            prop_assert_eq!(requested - matched, shortfall, "shortfall for {}", id);
        }
    }

    /// **Property 2: FIFO order**
    ///
    /// What stays open is always the latest acquisitions, with only the
    /// oldest remaining one possibly reduced and keeping its date.
    #[test]
    fn prop_open_lots_are_latest_acquisitions(transactions in arb_transactions(60)) {
        let outcome = FifoLedger::new().apply(&transactions);

        for (id, _) in SECURITIES {
            let acquisitions = replayed_acquisitions(&transactions, id);
            let lots: Vec<(NaiveDate, Decimal)> = outcome
                .lots_for(id)
                .map(|lots| lots.iter().map(|l| (l.opened_date, l.remaining_quantity)).collect())
                .unwrap_or_default();

            prop_assert!(lots.len() <= acquisitions.len());
            let tail = &acquisitions[acquisitions.len() - lots.len()..];
            for (index, (lot, acquisition)) in lots.iter().zip(tail).enumerate() {
                prop_assert_eq!(lot.0, acquisition.0, "opened date of lot {}", index);
                prop_assert!(lot.1 > Decimal::ZERO);
                if index == 0 {
                    prop_assert!(lot.1 <= acquisition.1);
                } else {
                    prop_assert_eq!(lot.1, acquisition.1);
                }
            }
        }
    }

    /// **Property 3: Disposal records consume oldest first**
    #[test]
    fn prop_disposals_in_opened_order(transactions in arb_transactions(60)) {
        let outcome = FifoLedger::new()
            .with_disposal_tracking(true)
            .apply(&transactions);

        for records in outcome.disposals.values() {
            for pair in records.windows(2) {
                prop_assert!(pair[0].closed_date <= pair[1].closed_date);
                prop_assert!(pair[0].opened_date <= pair[1].opened_date);
            }
            for record in records {
                prop_assert!(record.opened_date <= record.closed_date);
            }
        }
    }

    /// **Property 4: Disposal tracking is invisible to open lots**
    #[test]
    fn prop_tracking_does_not_change_open_lots(transactions in arb_transactions(60)) {
        let tracked = FifoLedger::new()
            .with_disposal_tracking(true)
            .apply(&transactions);
        let untracked = FifoLedger::new().apply(&transactions);

        prop_assert_eq!(tracked.open_lots, untracked.open_lots);
        prop_assert_eq!(tracked.anomalies, untracked.anomalies);
    }

    /// **Property 5: Aging boundary is inclusive**
    ///
    /// A lot held the first whole day at or past the threshold qualifies;
    /// one day less does not.
    #[test]
    fn prop_aging_boundary(years in 1u32..15, quarter in 0u32..4, as_of_offset in 0i64..3_650) {
        let threshold = years as f64 + quarter as f64 * 0.25;
        let as_of = base_date() + Duration::days(6_000 + as_of_offset);
        let filter = AgingFilter::new(threshold, as_of);
        let boundary_days = (threshold * 365.25).ceil() as i64;

        prop_assert!(filter.qualifies(as_of - Duration::days(boundary_days)));
        prop_assert!(!filter.qualifies(as_of - Duration::days(boundary_days - 1)));
    }
}
