//! Command-line arguments and the defaults the library leaves to callers.

use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use clap::Parser;

use lotwise_core::constants::{DEFAULT_AGING_THRESHOLD_YEARS, DEFAULT_TARGET_CURRENCY};
use lotwise_core::AnalysisConfig;

pub const DEFAULT_INPUT_FILE: &str = "Transactions.csv";
pub const DEFAULT_TICKER_MAPPINGS_FILE: &str = "ticker_mappings.csv";
const CACHE_DIR_NAME: &str = "lotwise";
const CACHE_FILE_NAME: &str = "price_cache.json";

const EXAMPLES: &str = "\
Examples:
  lotwise                                       Display current positions
  lotwise --with-sold                           Display current and sold positions
  lotwise --can-be-sold                         Display only lots held past the threshold
  lotwise --with-prices                         Display current positions with live prices
  lotwise --can-be-sold --with-prices           Display aged lots with current values
  lotwise --with-prices --no-cache              Fetch fresh prices (ignore cache)
  lotwise --ticker-mappings my_tickers.csv      Use a custom ticker mappings file
  lotwise --export positions.csv --with-sold    Export current and sold positions
  lotwise --input custom.csv                    Use a custom input file";

#[derive(Parser, Debug, Clone)]
#[command(name = "lotwise", version)]
#[command(about = "FIFO position analyzer for broker transaction exports", long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Input CSV file with transactions
    #[arg(long, value_name = "FILENAME", default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Export positions to a CSV file instead of printing them
    #[arg(long, value_name = "FILENAME")]
    pub export: Option<PathBuf>,

    /// Include historical sold positions in output
    #[arg(long, conflicts_with = "can_be_sold")]
    pub with_sold: bool,

    /// Show only lots held for at least --years years
    #[arg(long)]
    pub can_be_sold: bool,

    /// Fetch and display current prices
    #[arg(long)]
    pub with_prices: bool,

    /// Force a fresh price fetch, ignoring the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Custom cache file location
    #[arg(long, value_name = "PATH")]
    pub cache_location: Option<PathBuf>,

    /// Custom ticker mappings CSV file
    #[arg(long, value_name = "PATH")]
    pub ticker_mappings: Option<PathBuf>,

    /// Minimum holding period in years for --can-be-sold
    #[arg(long, value_name = "N", default_value_t = DEFAULT_AGING_THRESHOLD_YEARS)]
    pub years: f64,

    /// Currency prices are converted into
    #[arg(long, value_name = "CCY", default_value = DEFAULT_TARGET_CURRENCY)]
    pub currency: String,

    /// Reference date for holding periods (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,
}

impl Cli {
    /// Flags that were given but do nothing in this combination.
    pub fn ineffective_flag_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if !self.with_prices {
            if self.no_cache {
                warnings.push("--no-cache has no effect without --with-prices");
            }
            if self.cache_location.is_some() {
                warnings.push("--cache-location has no effect without --with-prices");
            }
        }
        warnings
    }

    pub fn overrides_path(&self) -> PathBuf {
        self.ticker_mappings
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TICKER_MAPPINGS_FILE))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_location.clone().unwrap_or_else(default_cache_path)
    }

    /// The clock is read here, once per run; the library never reads it.
    pub fn analysis_config(&self) -> AnalysisConfig {
        let as_of_date = self.as_of.unwrap_or_else(|| Local::now().date_naive());
        AnalysisConfig {
            target_currency: self.currency.trim().to_ascii_uppercase(),
            threshold_years: self.years,
            track_disposals: self.with_sold,
            aging: self.can_be_sold,
            fetch_prices: self.with_prices,
            use_cache: !self.no_cache,
            cache_path: self.with_prices.then(|| self.cache_path()),
            overrides_path: Some(self.overrides_path()),
            ..AnalysisConfig::new(as_of_date, Utc::now())
        }
    }
}

/// `<platform cache dir>/lotwise/price_cache.json`, or a relative
/// `.cache/lotwise/price_cache.json` where the platform has none.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join(CACHE_DIR_NAME)
        .join(CACHE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lotwise").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.input, PathBuf::from("Transactions.csv"));
        assert_eq!(cli.overrides_path(), PathBuf::from("ticker_mappings.csv"));
        assert!(cli.cache_path().ends_with("lotwise/price_cache.json"));

        let config = cli.analysis_config();
        assert_eq!(config.target_currency, "EUR");
        assert_eq!(config.threshold_years, 3.0);
        assert!(!config.fetch_prices);
        assert!(config.use_cache);
        assert!(config.cache_path.is_none());
    }

    #[test]
    fn test_with_sold_conflicts_with_can_be_sold() {
        let result = Cli::try_parse_from(["lotwise", "--with-sold", "--can-be-sold"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_flags_without_prices_warn() {
        let cli = parse(&["--no-cache", "--cache-location", "/tmp/cache.json"]);
        assert_eq!(cli.ineffective_flag_warnings().len(), 2);

        let cli = parse(&["--with-prices", "--no-cache"]);
        assert!(cli.ineffective_flag_warnings().is_empty());
    }

    #[test]
    fn test_flags_map_onto_analysis_config() {
        let cli = parse(&[
            "--can-be-sold",
            "--with-prices",
            "--no-cache",
            "--cache-location",
            "prices.json",
            "--years",
            "4",
            "--currency",
            "usd",
            "--as-of",
            "2024-06-01",
        ]);

        let config = cli.analysis_config();
        assert!(config.aging);
        assert!(!config.track_disposals);
        assert!(config.fetch_prices);
        assert!(!config.use_cache);
        assert_eq!(config.cache_path, Some(PathBuf::from("prices.json")));
        assert_eq!(config.threshold_years, 4.0);
        assert_eq!(config.target_currency, "USD");
        assert_eq!(
            config.as_of_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_invalid_as_of_rejected() {
        let result = Cli::try_parse_from(["lotwise", "--as-of", "01-06-2024"]);
        assert!(result.is_err());
    }
}
