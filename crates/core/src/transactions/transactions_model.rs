use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One buy or sell from the transaction feed.
///
/// A positive quantity is an acquisition, a negative one a disposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Stable identifier, typically the ISIN
    pub security_id: String,
    pub display_name: String,
    pub quantity: Decimal,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        security_id: impl Into<String>,
        display_name: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            date,
            security_id: security_id.into(),
            display_name: display_name.into(),
            quantity,
        }
    }

    pub fn is_acquisition(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_disposal(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    pub fn security_key(&self) -> SecurityKey {
        SecurityKey::new(self.display_name.clone(), self.security_id.clone())
    }
}

/// Identity of one ledger queue: display name plus identifier.
///
/// Orders by name first so reports come out alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityKey {
    pub display_name: String,
    pub security_id: String,
}

impl SecurityKey {
    pub fn new(display_name: impl Into<String>, security_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            security_id: security_id.into(),
        }
    }
}

impl fmt::Display for SecurityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.security_id)
    }
}
