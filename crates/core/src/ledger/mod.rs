//! FIFO lot ledger.
//!
//! Replays a transaction stream in date order, keeping one queue of open
//! lots per security. Disposals consume the oldest lots first; a disposal
//! larger than everything still open is reported as an
//! [`OversellAnomaly`] and the replay carries on.

mod fifo_ledger;
mod ledger_model;


pub use fifo_ledger::{FifoLedger, LedgerOutcome};
pub use ledger_model::{DisposalRecord, Lot, OpenPosition, OversellAnomaly};
