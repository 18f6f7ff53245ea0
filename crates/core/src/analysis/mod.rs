//! End-to-end analysis of a transaction set.
//!
//! ```text
//! transactions ──► FifoLedger ──► positions ──► value_positions ──► AgingFilter
//!                      │                         (QuoteService)         │
//!                      ▼                               │                ▼
//!                 disposals,                    cache + overrides   aged view
//!                 anomalies                     saved afterwards
//! ```

mod analysis_model;
mod analysis_service;


pub use analysis_model::PortfolioAnalysis;
pub use analysis_service::{analyze, register_unmapped_securities};
