//! Symbol resolution for quote sources.
//!
//! This module provides the resolver chain that maps a security identifier
//! (an ISIN in broker exports) to a symbol a quote source understands.
//!
//! # Architecture
//!
//! The resolver uses a chain of responsibility pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ResolverChain                           │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 1. Override table (ticker_mappings.csv)                 │ │
//! │  │    - ISIN,NAME,TICKER rows maintained by the user       │ │
//! │  │    - Rows with an empty TICKER are skipped              │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                           │ miss                             │
//! │                           ▼                                  │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 2. Rules Resolver (best effort)                         │ │
//! │  │    - US ISINs only                                      │ │
//! │  │    - Company name minus corporate suffix, <= 5 chars    │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                           │ miss                             │
//! │                           ▼                                  │
//! │        pending row appended to the override table           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod chain;
mod override_table;
mod rules_resolver;
mod traits;

// Re-export main types
pub use chain::ResolverChain;
pub use override_table::{OverrideRow, OverrideTable};
pub use rules_resolver::{symbol_from_name, RulesResolver};
pub use traits::{ResolutionSource, ResolvedSymbol, Resolver};
