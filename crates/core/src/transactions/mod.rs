//! Transaction records and the broker export reader.

mod csv_parser;
mod transactions_model;

pub use csv_parser::{parse_transactions, parse_transactions_file, ParsedTransactions};
pub use transactions_model::{SecurityKey, Transaction};
