//! HTTP handlers for the Tradebook API

pub mod auth;
pub mod catalog;
pub mod invoice;
pub mod ledger;
pub mod party;
pub mod payment;
pub mod report;
pub mod stock;
