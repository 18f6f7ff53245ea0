//! Broker transaction export reader.
//!
//! Reads the DeGiro `Transactions.csv` layout. Only four columns are used,
//! looked up by header name so extra or reordered columns do not matter:
//! `Date` (`dd-mm-yyyy`), `Product`, `ISIN` and `Quantity` (decimal comma
//! accepted). Rows that cannot be turned into a valid [`Transaction`] are
//! skipped with a warning; they never reach the ledger.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};
use rust_decimal::Decimal;

use super::transactions_model::Transaction;
use crate::constants::TRANSACTION_DATE_FORMAT;
use crate::errors::{Error, ValidationError};
use crate::Result;

const DATE_COLUMN: &str = "Date";
const PRODUCT_COLUMN: &str = "Product";
const ISIN_COLUMN: &str = "ISIN";
const QUANTITY_COLUMN: &str = "Quantity";

/// Result of reading a transaction export.
#[derive(Debug, Clone, Default)]
pub struct ParsedTransactions {
    pub transactions: Vec<Transaction>,
    /// Rows dropped because a field was missing or invalid
    pub skipped_rows: usize,
}

/// Read transactions from a file. A missing file is an error.
pub fn parse_transactions_file(path: impl AsRef<Path>) -> Result<ParsedTransactions> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Transaction file {}: {}", path.display(), e),
        ))
    })?;
    parse_transactions(file)
}

/// Read transactions from any CSV source with a header row.
pub fn parse_transactions<R: Read>(reader: R) -> Result<ParsedTransactions> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut parsed = ParsedTransactions::default();
    for (index, record) in reader.records().enumerate() {
        // Header is line 1
        let row_num = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Row {}: unreadable ({}), skipping", row_num, e);
                parsed.skipped_rows += 1;
                continue;
            }
        };

        match columns.transaction(&record) {
            Ok(transaction) => parsed.transactions.push(transaction),
            Err(reason) => {
                warn!("Row {}: {}, skipping", row_num, reason);
                parsed.skipped_rows += 1;
            }
        }
    }

    if parsed.skipped_rows > 0 {
        info!("Skipped {} invalid rows", parsed.skipped_rows);
    }
    Ok(parsed)
}

/// Positions of the required columns in the header row.
struct Columns {
    date: usize,
    product: usize,
    isin: usize,
    quantity: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
                .ok_or_else(|| Error::Validation(ValidationError::MissingField(name.to_string())))
        };
        Ok(Self {
            date: find(DATE_COLUMN)?,
            product: find(PRODUCT_COLUMN)?,
            isin: find(ISIN_COLUMN)?,
            quantity: find(QUANTITY_COLUMN)?,
        })
    }

    fn transaction(&self, record: &StringRecord) -> std::result::Result<Transaction, String> {
        let field = |index: usize| record.get(index).unwrap_or("");
        let (date, product, isin, quantity) = (
            field(self.date),
            field(self.product),
            field(self.isin),
            field(self.quantity),
        );

        if date.is_empty() || quantity.is_empty() {
            return Err("missing Date or Quantity".to_string());
        }
        if product.is_empty() || isin.is_empty() {
            return Err("missing Product or ISIN".to_string());
        }

        let date = NaiveDate::parse_from_str(date, TRANSACTION_DATE_FORMAT)
            .map_err(|_| format!("invalid date format '{}'", date))?;
        let quantity = parse_quantity(quantity).map_err(|e| format!("{} '{}'", e, quantity))?;

        Ok(Transaction::new(date, isin, product, quantity))
    }
}

/// Parse a quantity, accepting a decimal comma. Zero is rejected.
fn parse_quantity(raw: &str) -> std::result::Result<Decimal, ValidationError> {
    let quantity = Decimal::from_str(&raw.replace(',', "."))?;
    if quantity.is_zero() {
        return Err(ValidationError::ZeroQuantity);
    }
    Ok(quantity.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const HEADER: &str = "Date,Time,Product,ISIN,Reference exchange,Venue,Quantity,Price";

    fn parse(body: &str) -> ParsedTransactions {
        let content = format!("{}\n{}", HEADER, body);
        parse_transactions(content.as_bytes()).unwrap()
    }

    #[test]
    fn test_parses_buys_and_sells() {
        let parsed = parse(
            "15-03-2021,09:05,ASML HOLDING,NL0010273215,EAM,XAMS,10,500.0\n\
             01-02-2022,10:00,ASML HOLDING,NL0010273215,EAM,XAMS,-4,600.0\n",
        );

        assert_eq!(parsed.skipped_rows, 0);
        assert_eq!(parsed.transactions.len(), 2);
        let buy = &parsed.transactions[0];
        assert_eq!(buy.date, NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
        assert_eq!(buy.security_id, "NL0010273215");
        assert_eq!(buy.display_name, "ASML HOLDING");
        assert_eq!(buy.quantity, dec!(10));
        assert!(parsed.transactions[1].is_disposal());
    }

    #[test]
    fn test_decimal_comma_quantity() {
        let parsed = parse("15-03-2021,09:05,VANGUARD FTSE,IE00B3RBWM25,EAM,XAMS,\"2,5\",90\n");
        assert_eq!(parsed.transactions[0].quantity, dec!(2.5));
    }

    #[test]
    fn test_skips_invalid_rows() {
        let parsed = parse(
            ",09:05,NO DATE,NL0000000001,EAM,XAMS,1,1\n\
             15-03-2021,09:05,,NL0000000002,EAM,XAMS,1,1\n\
             2021-03-15,09:05,ISO DATE,NL0000000003,EAM,XAMS,1,1\n\
             15-03-2021,09:05,BAD QTY,NL0000000004,EAM,XAMS,abc,1\n\
             15-03-2021,09:05,ZERO QTY,NL0000000005,EAM,XAMS,0,1\n\
             15-03-2021,09:05,GOOD,NL0000000006,EAM,XAMS,3,1\n",
        );

        assert_eq!(parsed.skipped_rows, 5);
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.transactions[0].display_name, "GOOD");
    }

    #[test]
    fn test_missing_required_column() {
        let content = "Date,Product,Quantity\n15-03-2021,ASML,1\n";
        let result = parse_transactions(content.as_bytes());
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::MissingField(ref f))) if f == "ISIN"
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_transactions_file(dir.path().join("Transactions.csv"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Transactions.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "01-06-2020,12:00,INTEL CORP,US4581401001,NDQ,XNAS,7,50").unwrap();

        let parsed = parse_transactions_file(&path).unwrap();
        assert_eq!(parsed.transactions.len(), 1);
    }
}
