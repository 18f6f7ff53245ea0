use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::NaiveDate;
use log::{debug, error, warn};
use rust_decimal::Decimal;

use super::ledger_model::{DisposalRecord, Lot, OpenPosition, OversellAnomaly};
use crate::transactions::{SecurityKey, Transaction};

/// Result of replaying a transaction stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerOutcome {
    /// Every security ever acquired, including ones whose queue is now empty
    pub open_lots: BTreeMap<SecurityKey, VecDeque<Lot>>,
    /// Matched disposals, oldest first; empty unless tracking was on
    pub disposals: BTreeMap<SecurityKey, Vec<DisposalRecord>>,
    pub anomalies: Vec<OversellAnomaly>,
}

impl LedgerOutcome {
    /// All positions, closed ones reported with a zero total.
    pub fn positions(&self) -> Vec<OpenPosition> {
        self.open_lots
            .iter()
            .map(|(key, lots)| OpenPosition::from_lots(key.clone(), lots))
            .collect()
    }

    /// Positions that still hold at least one lot.
    pub fn open_positions(&self) -> Vec<OpenPosition> {
        self.open_lots
            .iter()
            .filter(|(_, lots)| !lots.is_empty())
            .map(|(key, lots)| OpenPosition::from_lots(key.clone(), lots))
            .collect()
    }

    /// Securities that were acquired and have since been fully disposed of.
    pub fn closed_securities(&self) -> Vec<&SecurityKey> {
        self.open_lots
            .iter()
            .filter(|(_, lots)| lots.is_empty())
            .map(|(key, _)| key)
            .collect()
    }

    /// Open lots for a security identifier.
    pub fn lots_for(&self, security_id: &str) -> Option<&VecDeque<Lot>> {
        self.open_lots
            .iter()
            .find(|(key, _)| key.security_id == security_id)
            .map(|(_, lots)| lots)
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// Strict chronological FIFO matching of disposals against acquisitions.
#[derive(Debug, Clone, Default)]
pub struct FifoLedger {
    track_disposals: bool,
}

impl FifoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record matched disposals. Does not change which lots stay open.
    pub fn with_disposal_tracking(mut self, track: bool) -> Self {
        self.track_disposals = track;
        self
    }

    /// Replay `transactions` in date order.
    ///
    /// Transactions sharing a date keep their input order. A security's
    /// queue is created on its first acquisition and carries the display
    /// name seen then, even if later rows spell it differently.
    pub fn apply(&self, transactions: &[Transaction]) -> LedgerOutcome {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|t| t.date);

        let mut keys: HashMap<&str, SecurityKey> = HashMap::new();
        let mut outcome = LedgerOutcome::default();

        for transaction in ordered {
            if transaction.is_acquisition() {
                let key = keys
                    .entry(transaction.security_id.as_str())
                    .or_insert_with(|| transaction.security_key())
                    .clone();
                outcome
                    .open_lots
                    .entry(key)
                    .or_default()
                    .push_back(Lot::new(transaction.date, transaction.quantity));
            } else if transaction.is_disposal() {
                let key = keys
                    .get(transaction.security_id.as_str())
                    .cloned()
                    .unwrap_or_else(|| transaction.security_key());
                let need = transaction.quantity.abs();

                let (unmatched, matched) = match outcome.open_lots.get_mut(&key) {
                    Some(lots) => relieve_lots(lots, need),
                    None => (need, Vec::new()),
                };

                if self.track_disposals && !matched.is_empty() {
                    outcome
                        .disposals
                        .entry(key.clone())
                        .or_default()
                        .extend(matched.into_iter().map(|(opened_date, quantity)| {
                            DisposalRecord {
                                key: key.clone(),
                                opened_date,
                                closed_date: transaction.date,
                                quantity,
                            }
                        }));
                }

                if unmatched > Decimal::ZERO {
                    error!(
                        "FIFO violation: oversold {} by {} shares on {}. \
                         Check for missing acquisitions or unrecorded corporate actions.",
                        key, unmatched, transaction.date
                    );
                    outcome.anomalies.push(OversellAnomaly {
                        key,
                        date: transaction.date,
                        unresolved_quantity: unmatched,
                    });
                }
            } else {
                warn!(
                    "Ignoring zero-quantity transaction for {} on {}",
                    transaction.security_id, transaction.date
                );
            }
        }

        debug!(
            "Ledger replay: {} securities, {} anomalies",
            outcome.open_lots.len(),
            outcome.anomalies.len()
        );
        outcome
    }
}

/// Consume `need` from the front of `lots`.
///
/// Returns the quantity that could not be matched and the
/// `(opened_date, quantity)` of every lot portion consumed.
fn relieve_lots(
    lots: &mut VecDeque<Lot>,
    mut need: Decimal,
) -> (Decimal, Vec<(NaiveDate, Decimal)>) {
    let mut matched = Vec::new();

    while need > Decimal::ZERO {
        let Some(head) = lots.front_mut() else {
            break;
        };

        if head.remaining_quantity <= need {
            need -= head.remaining_quantity;
            matched.push((head.opened_date, head.remaining_quantity));
            lots.pop_front();
        } else {
            head.remaining_quantity -= need;
            matched.push((head.opened_date, need));
            need = Decimal::ZERO;
        }
    }

    (need, matched)
}
