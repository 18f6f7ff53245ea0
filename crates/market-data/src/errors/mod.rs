//! Error types for the market data crate.
//!
//! Nothing in here is fatal to a valuation run. The quote service turns
//! every [`MarketDataError`] coming out of a [`QuoteSource`](crate::QuoteSource)
//! into a [`FetchStatus`](crate::FetchStatus) on the cache entry, and storage
//! errors are logged by the caller before it carries on with in-memory state.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the quote source.
    /// Delisted and mistyped symbols end up here.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol exists but the source returned no usable price.
    #[error("No price data for {0}")]
    NoPriceData(String),

    /// A source-specific error occurred (bad status, unparsable payload).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The source that returned the error
        provider: String,
        /// The error message from the source
        message: String,
    },

    /// The source returned an exchange rate that cannot be used for conversion.
    #[error("Invalid exchange rate for {from}/{to}: {rate}")]
    InvalidRate {
        from: String,
        to: String,
        rate: String,
    },

    /// A network error occurred while communicating with a source.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Reading or writing a local store (quote cache, override table) failed.
    #[error("Storage error at {}: {message}", path.display())]
    Storage {
        /// The file that could not be read or written
        path: PathBuf,
        /// What went wrong
        message: String,
    },
}

impl MarketDataError {
    pub(crate) fn storage(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether the error came from local persistence rather than a remote source.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}
