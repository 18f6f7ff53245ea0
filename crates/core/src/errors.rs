//! Core error types for Lotwise.
//!
//! Only a handful of conditions stop an analysis: no transactions at all,
//! an unreadable input file, or an invalid configuration. Everything the
//! ledger or the valuation pass runs into is reported through the analysis
//! result instead.

use thiserror::Error;

use lotwise_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analysis crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No transactions to analyze")]
    NoTransactions,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Quantity must not be zero")]
    ZeroQuantity,
}
