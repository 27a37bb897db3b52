//! Business logic services for Tradebook

pub mod auth;
pub mod catalog;
pub mod invoice;
pub mod ledger;
pub mod party;
pub mod payment;
pub mod report;
pub mod stock;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use invoice::InvoiceService;
pub use ledger::LedgerService;
pub use party::PartyService;
pub use payment::PaymentService;
pub use report::ReportService;
pub use stock::StockService;
