//! Database models for Tradebook
//!
//! Row types shared across services. Pure domain logic (costing, ledger,
//! report arithmetic) lives in the `shared` crate; these are the persisted
//! shapes it operates on.

pub mod catalog;
pub mod invoice;
pub mod party;
pub mod payment;
pub mod stock;
pub mod user;

pub use catalog::*;
pub use invoice::*;
pub use party::*;
pub use payment::*;
pub use stock::*;
pub use user::*;
