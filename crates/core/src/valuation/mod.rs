//! Valuation pass.
//!
//! Attaches price information to positions and computes their value in
//! the target currency. A missing price gives a missing value, never zero,
//! and aggregates skip missing values.

mod valuation_model;
mod valuation_service;

pub use valuation_model::{NotPriced, ValuationSummary, ValuedPosition};
pub use valuation_service::{
    group_not_priced, position_value, summarize, value_aged, value_positions, PriceLookup,
};
