/// Fixed year length used for every holding-period calculation
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Minimum holding period, in years, for a lot to count as aged
pub const DEFAULT_AGING_THRESHOLD_YEARS: f64 = 3.0;

/// Currency every valuation is expressed in unless configured otherwise
pub const DEFAULT_TARGET_CURRENCY: &str = "EUR";

/// Lifetime of cached quotes and exchange rates
pub use lotwise_market_data::DEFAULT_CACHE_VALIDITY_HOURS;

/// Date format of broker transaction exports
pub const TRANSACTION_DATE_FORMAT: &str = "%d-%m-%Y";

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
