use std::collections::VecDeque;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::SecurityKey;

/// Quantity still held from one acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub opened_date: NaiveDate,
    /// Always positive; the lot is removed when it reaches zero
    pub remaining_quantity: Decimal,
}

impl Lot {
    pub fn new(opened_date: NaiveDate, remaining_quantity: Decimal) -> Self {
        Self {
            opened_date,
            remaining_quantity,
        }
    }
}

/// Part of a lot closed by a disposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisposalRecord {
    pub key: SecurityKey,
    pub opened_date: NaiveDate,
    pub closed_date: NaiveDate,
    pub quantity: Decimal,
}

/// A disposal that exceeded every open lot of its security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OversellAnomaly {
    pub key: SecurityKey,
    pub date: NaiveDate,
    /// Quantity left unmatched once the queue ran empty
    pub unresolved_quantity: Decimal,
}

/// Open lots of one security, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub key: SecurityKey,
    pub lots: Vec<Lot>,
    pub total_quantity: Decimal,
}

impl OpenPosition {
    pub fn from_lots(key: SecurityKey, lots: &VecDeque<Lot>) -> Self {
        Self {
            key,
            total_quantity: lots.iter().map(|lot| lot.remaining_quantity).sum(),
            lots: lots.iter().cloned().collect(),
        }
    }

    /// True when every lot has been disposed of.
    pub fn is_closed(&self) -> bool {
        self.lots.is_empty()
    }
}
