//! Lotwise Core - FIFO lot ledger, holding-period filter and valuation.
//!
//! This crate turns a stream of buy and sell transactions into open lots,
//! values them through the `lotwise-market-data` quote service, and picks
//! out the lots held past an aging threshold. It never reads environment
//! variables or chooses file locations; callers pass an
//! [`AnalysisConfig`](config::AnalysisConfig).

pub mod aging;
pub mod analysis;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod transactions;
pub mod valuation;

pub use analysis::{analyze, register_unmapped_securities, PortfolioAnalysis};
pub use config::AnalysisConfig;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
