//! Shared domain logic for Tradebook
//!
//! This crate contains the pure, storage-free core of the system: FIFO batch
//! costing, ledger statement building, financial report arithmetic, and input
//! validation. The backend wires these into Postgres; nothing in here performs
//! I/O, which keeps the costing and ledger invariants directly testable.

pub mod costing;
pub mod ledger;
pub mod reporting;
pub mod types;
pub mod validation;

pub use costing::*;
pub use ledger::*;
pub use reporting::*;
pub use types::*;
pub use validation::*;
