//! Override table - user-maintained identifier to symbol mappings.
//!
//! Persisted as a CSV file with the header `ISIN,NAME,TICKER`. Securities
//! no symbol could be found for are appended with an empty `TICKER` so they
//! can be filled in by hand; the next run picks the fix up.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::SecurityId;

use super::traits::{ResolutionSource, ResolvedSymbol, Resolver};

/// One row of the override file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRow {
    #[serde(rename = "ISIN", default)]
    pub security_id: SecurityId,
    #[serde(rename = "NAME", default)]
    pub display_name: String,
    /// Empty while the row is waiting for a manual fix.
    #[serde(rename = "TICKER", default)]
    pub symbol: String,
}

impl OverrideRow {
    pub fn is_pending(&self) -> bool {
        self.symbol.is_empty()
    }
}

/// In-memory override table, optionally bound to a file.
#[derive(Debug, Default)]
pub struct OverrideTable {
    path: Option<PathBuf>,
    rows: BTreeMap<SecurityId, OverrideRow>,
    dirty: bool,
}

impl OverrideTable {
    /// Create an empty table that is never written anywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from `path`, creating a header-only file when missing.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let mut table = Self {
            path: Some(path.to_path_buf()),
            ..Self::default()
        };

        if !path.exists() {
            debug!("Override table {} not found, creating it", path.display());
            table.write_rows()?;
            return Ok(table);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| MarketDataError::storage(path, e))?;

        for row in reader.deserialize::<OverrideRow>() {
            let row = row.map_err(|e| MarketDataError::storage(path, e))?;
            if row.security_id.is_empty() {
                continue;
            }
            table.insert_row(row);
        }

        debug!(
            "Loaded {} override rows ({} with symbols) from {}",
            table.rows.len(),
            table.rows.values().filter(|r| !r.is_pending()).count(),
            path.display()
        );
        Ok(table)
    }

    /// Like [`load_or_create`](Self::load_or_create), but an unreadable file
    /// yields an empty in-memory table.
    ///
    /// The fallback table is not bound to `path`, so saving it can never
    /// overwrite the mappings that failed to load.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_or_create(path) {
            Ok(table) => table,
            Err(e) => {
                warn!(
                    "Could not load override table, continuing without it (changes will not be saved): {}",
                    e
                );
                Self::new()
            }
        }
    }

    // A later non-empty symbol replaces an earlier row; an empty one never does.
    fn insert_row(&mut self, row: OverrideRow) {
        match self.rows.get(&row.security_id) {
            Some(existing) if !existing.is_pending() && row.is_pending() => {}
            _ => {
                self.rows.insert(row.security_id.clone(), row);
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when rows were added or changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains(&self, security_id: &str) -> bool {
        self.rows.contains_key(security_id)
    }

    /// The user-supplied symbol, if the row exists and is filled in.
    pub fn symbol_for(&self, security_id: &str) -> Option<&str> {
        self.rows
            .get(security_id)
            .filter(|row| !row.is_pending())
            .map(|row| row.symbol.as_str())
    }

    /// Rows still waiting for a symbol.
    pub fn pending(&self) -> impl Iterator<Item = &OverrideRow> {
        self.rows.values().filter(|row| row.is_pending())
    }

    /// Set or replace the symbol for a security.
    pub fn set_symbol(&mut self, security_id: &str, display_name: &str, symbol: &str) {
        self.rows.insert(
            security_id.to_string(),
            OverrideRow {
                security_id: security_id.to_string(),
                display_name: display_name.to_string(),
                symbol: symbol.trim().to_string(),
            },
        );
        self.dirty = true;
    }

    /// Append a pending row unless the identifier already has one.
    ///
    /// Returns `true` when a row was added. Existing rows, filled in or not,
    /// are left untouched.
    pub fn ensure_entry(&mut self, security_id: &str, display_name: &str) -> bool {
        if security_id.is_empty() || self.rows.contains_key(security_id) {
            return false;
        }
        self.rows.insert(
            security_id.to_string(),
            OverrideRow {
                security_id: security_id.to_string(),
                display_name: display_name.to_string(),
                symbol: String::new(),
            },
        );
        self.dirty = true;
        true
    }

    /// Register every security that has no row yet.
    ///
    /// Returns the rows that were added, sorted by name.
    pub fn register_missing<'a, I>(&mut self, securities: I) -> Vec<OverrideRow>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut added = Vec::new();
        for (security_id, display_name) in securities {
            if self.ensure_entry(security_id, display_name) {
                added.push(OverrideRow {
                    security_id: security_id.to_string(),
                    display_name: display_name.to_string(),
                    symbol: String::new(),
                });
            }
        }
        added.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        added
    }

    /// Write the table to its file, sorted by name.
    pub fn save(&mut self) -> Result<(), MarketDataError> {
        self.write_rows()?;
        self.dirty = false;
        Ok(())
    }

    /// Write the table only if something changed and it is bound to a file.
    pub fn save_if_changed(&mut self) -> Result<bool, MarketDataError> {
        if !self.dirty || self.path.is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn write_rows(&self) -> Result<(), MarketDataError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MarketDataError::storage(parent, e))?;
        }

        let mut rows: Vec<&OverrideRow> = self.rows.values().collect();
        rows.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.security_id.cmp(&b.security_id))
        });

        let mut writer = csv::Writer::from_path(path).map_err(|e| MarketDataError::storage(path, e))?;
        if rows.is_empty() {
            writer
                .write_record(["ISIN", "NAME", "TICKER"])
                .map_err(|e| MarketDataError::storage(path, e))?;
        }
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| MarketDataError::storage(path, e))?;
        }
        writer.flush().map_err(|e| MarketDataError::storage(path, e))?;
        Ok(())
    }
}

impl Resolver for OverrideTable {
    fn resolve(&self, security_id: &str, _display_name: &str) -> Option<ResolvedSymbol> {
        self.symbol_for(security_id)
            .map(|symbol| ResolvedSymbol::new(symbol, ResolutionSource::Override))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_created_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("ticker_mappings.csv");

        let table = OverrideTable::load_or_create(&path).unwrap();

        assert!(table.is_empty());
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "ISIN,NAME,TICKER");
    }

    #[test]
    fn test_load_trims_and_skips_blank_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.csv");
        fs::write(
            &path,
            "ISIN,NAME,TICKER\n NL0010273215 , ASML HOLDING , ASML.AS \n,No id,XXX\nUS0000000001,PENDING CO,\n",
        )
        .unwrap();

        let table = OverrideTable::load_or_create(&path).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.symbol_for("NL0010273215"), Some("ASML.AS"));
        assert_eq!(table.symbol_for("US0000000001"), None);
        assert!(table.contains("US0000000001"));
        assert_eq!(table.pending().count(), 1);
    }

    #[test]
    fn test_ensure_entry_is_idempotent_and_never_overwrites() {
        let mut table = OverrideTable::new();
        table.set_symbol("IE00B4L5Y983", "ISHARES MSCI WORLD", "IWDA.AS");

        assert!(!table.ensure_entry("IE00B4L5Y983", "Other name"));
        assert_eq!(table.symbol_for("IE00B4L5Y983"), Some("IWDA.AS"));

        assert!(table.ensure_entry("DE0007164600", "SAP SE"));
        assert!(!table.ensure_entry("DE0007164600", "SAP SE"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_save_sorts_by_name_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.csv");
        let mut table = OverrideTable::load_or_create(&path).unwrap();

        table.ensure_entry("DE0007164600", "SAP SE");
        table.set_symbol("NL0010273215", "ASML HOLDING", "ASML.AS");
        assert!(table.save_if_changed().unwrap());
        assert!(!table.save_if_changed().unwrap());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ISIN,NAME,TICKER",
                "NL0010273215,ASML HOLDING,ASML.AS",
                "DE0007164600,SAP SE,",
            ]
        );

        let reloaded = OverrideTable::load_or_create(&path).unwrap();
        assert_eq!(reloaded.symbol_for("NL0010273215"), Some("ASML.AS"));
        assert!(reloaded.contains("DE0007164600"));
    }

    #[test]
    fn test_register_missing_returns_new_rows_only() {
        let mut table = OverrideTable::new();
        table.set_symbol("NL0010273215", "ASML HOLDING", "ASML.AS");

        let added = table.register_missing([
            ("NL0010273215", "ASML HOLDING"),
            ("US4581401001", "INTEL CORP"),
            ("DE0007164600", "SAP SE"),
            ("US4581401001", "INTEL CORP"),
        ]);

        let names: Vec<&str> = added.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["INTEL CORP", "SAP SE"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_duplicate_rows_keep_filled_symbol() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.csv");
        fs::write(
            &path,
            "ISIN,NAME,TICKER\nUS0000000001,FOO,FOO\nUS0000000001,FOO,\n",
        )
        .unwrap();

        let table = OverrideTable::load_or_create(&path).unwrap();
        assert_eq!(table.symbol_for("US0000000001"), Some("FOO"));
    }

    #[test]
    fn test_unreadable_file_is_never_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.csv");
        let original: &[u8] =
            b"ISIN,NAME,TICKER\nUS0378331005,APPLE,AAPL\nCH0038863350,NESTL\xC9,NESN.SW\n";
        fs::write(&path, original).unwrap();

        let mut table = OverrideTable::load(&path);
        assert!(table.is_empty());
        assert!(table.path().is_none());

        assert!(table.ensure_entry("NL0010273215", "ASML HOLDING"));
        assert!(!table.save_if_changed().unwrap());

        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_in_memory_table_saves_nowhere() {
        let mut table = OverrideTable::new();
        table.ensure_entry("US0000000001", "FOO");
        assert!(table.save().is_ok());
        assert!(table.path().is_none());
    }
}
