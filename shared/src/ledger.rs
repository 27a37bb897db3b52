//! Party ledger statement builder
//!
//! Reconstructs a running-balance statement for one counterparty from its
//! invoices (debits) and payments (credits). The builder is deterministic:
//! entries are ordered by date, then invoices before payments, then by id, so
//! rebuilding a statement from identical stored records always yields the
//! same balances.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a ledger entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    /// Sales invoice issued to a customer (debit).
    Sale,
    /// Purchase invoice received from a supplier (debit).
    Purchase,
    /// Payment received from a customer (credit).
    Receipt,
    /// Payment made to a supplier (credit).
    Payment,
}

impl LedgerEntryKind {
    /// Same-date ordering rank: invoices sort before payments.
    fn rank(self) -> u8 {
        match self {
            LedgerEntryKind::Sale | LedgerEntryKind::Purchase => 0,
            LedgerEntryKind::Receipt | LedgerEntryKind::Payment => 1,
        }
    }
}

/// One invoice or payment feeding a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: LedgerEntryKind,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// A statement line: an entry plus the balance after applying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub balance: Decimal,
}

/// Running-balance statement for one counterparty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStatement {
    pub opening_balance: Decimal,
    pub transactions: Vec<StatementLine>,
    pub closing_balance: Decimal,
}

/// Opening balance for a windowed statement: the stored balance plus all
/// pre-window debits minus all pre-window credits.
pub fn opening_balance(stored: Decimal, pre_debits: Decimal, pre_credits: Decimal) -> Decimal {
    stored + pre_debits - pre_credits
}

/// Build a statement from unordered entries.
///
/// The running balance starts at `opening` and accumulates
/// `+debit - credit` per entry in chronological order. With no entries the
/// closing balance equals the opening balance.
pub fn build_statement(opening: Decimal, mut entries: Vec<LedgerEntry>) -> LedgerStatement {
    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.kind.rank().cmp(&b.kind.rank()))
            .then(a.id.cmp(&b.id))
    });

    let mut running = opening;
    let transactions = entries
        .into_iter()
        .map(|entry| {
            running = running + entry.debit - entry.credit;
            StatementLine {
                entry,
                balance: running,
            }
        })
        .collect();

    LedgerStatement {
        opening_balance: opening,
        transactions,
        closing_balance: running,
    }
}
