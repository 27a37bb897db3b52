//! Party ledger statement tests
//!
//! Ordering, opening balance arithmetic, and running balance accumulation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::ledger::{build_statement, opening_balance, LedgerEntry, LedgerEntryKind};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn sale(day: u32, amount: &str) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        date: date(day),
        kind: LedgerEntryKind::Sale,
        description: format!("SINV-2024-{:02}", day),
        debit: dec(amount),
        credit: Decimal::ZERO,
    }
}

fn receipt(day: u32, amount: &str) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        date: date(day),
        kind: LedgerEntryKind::Receipt,
        description: "cash".to_string(),
        debit: Decimal::ZERO,
        credit: dec(amount),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_opening_plus_sale_minus_receipt() {
        let opening = opening_balance(dec("100"), Decimal::ZERO, Decimal::ZERO);
        let statement = build_statement(opening, vec![sale(5, "500"), receipt(10, "200")]);

        assert_eq!(statement.opening_balance, dec("100"));
        assert_eq!(statement.transactions[0].balance, dec("600"));
        assert_eq!(statement.transactions[1].balance, dec("400"));
        assert_eq!(statement.closing_balance, dec("400"));
    }

    #[test]
    fn test_pre_window_activity_folds_into_opening() {
        // Stored 100, pre-window invoices 900, pre-window payments 400
        let opening = opening_balance(dec("100"), dec("900"), dec("400"));
        assert_eq!(opening, dec("600"));

        let statement = build_statement(opening, vec![]);
        assert_eq!(statement.closing_balance, dec("600"));
    }

    #[test]
    fn test_entries_sorted_by_date() {
        let statement =
            build_statement(Decimal::ZERO, vec![sale(20, "50"), sale(5, "30"), sale(12, "20")]);

        let dates: Vec<NaiveDate> = statement
            .transactions
            .iter()
            .map(|l| l.entry.date)
            .collect();
        assert_eq!(dates, vec![date(5), date(12), date(20)]);
    }

    #[test]
    fn test_same_day_invoice_before_payment() {
        // Payment first in input order, invoice must still rank first
        let statement = build_statement(Decimal::ZERO, vec![receipt(7, "100"), sale(7, "100")]);

        assert_eq!(statement.transactions[0].entry.kind, LedgerEntryKind::Sale);
        assert_eq!(statement.transactions[0].balance, dec("100"));
        assert_eq!(statement.transactions[1].balance, Decimal::ZERO);
    }

    #[test]
    fn test_empty_statement_keeps_opening() {
        let statement = build_statement(dec("-250"), vec![]);
        assert_eq!(statement.opening_balance, dec("-250"));
        assert_eq!(statement.closing_balance, dec("-250"));
        assert!(statement.transactions.is_empty());
    }

    #[test]
    fn test_balance_may_go_negative_on_overpayment() {
        let statement = build_statement(Decimal::ZERO, vec![sale(1, "100"), receipt(2, "150")]);
        assert_eq!(statement.closing_balance, dec("-50"));
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let entries = vec![sale(3, "10"), receipt(3, "4"), sale(1, "7"), receipt(9, "2")];
        let a = build_statement(dec("5"), entries.clone());
        let b = build_statement(dec("5"), entries);
        assert_eq!(a, b);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn entry_strategy() -> impl Strategy<Value = LedgerEntry> {
        (1u32..=28u32, amount_strategy(), prop::bool::ANY).prop_map(|(day, amount, is_debit)| {
            if is_debit {
                sale(day, &amount.to_string())
            } else {
                receipt(day, &amount.to_string())
            }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Closing balance equals opening plus total debits minus total
        /// credits, independent of entry order.
        #[test]
        fn prop_closing_balance_identity(
            opening in amount_strategy(),
            entries in prop::collection::vec(entry_strategy(), 0..30)
        ) {
            let debits: Decimal = entries.iter().map(|e| e.debit).sum();
            let credits: Decimal = entries.iter().map(|e| e.credit).sum();

            let statement = build_statement(opening, entries);
            prop_assert_eq!(statement.closing_balance, opening + debits - credits);
        }

        /// Each line's balance is the previous balance plus its own
        /// debit minus its own credit.
        #[test]
        fn prop_running_balance_chains(
            opening in amount_strategy(),
            entries in prop::collection::vec(entry_strategy(), 1..30)
        ) {
            let statement = build_statement(opening, entries);

            let mut previous = statement.opening_balance;
            for line in &statement.transactions {
                prop_assert_eq!(line.balance, previous + line.entry.debit - line.entry.credit);
                previous = line.balance;
            }
            prop_assert_eq!(previous, statement.closing_balance);
        }

        /// Shuffling the input entries never changes the statement.
        #[test]
        fn prop_order_insensitive(
            opening in amount_strategy(),
            mut entries in prop::collection::vec(entry_strategy(), 0..20)
        ) {
            let a = build_statement(opening, entries.clone());
            entries.reverse();
            let b = build_statement(opening, entries);
            prop_assert_eq!(a, b);
        }

        /// Dates never decrease along a statement.
        #[test]
        fn prop_dates_monotonic(
            entries in prop::collection::vec(entry_strategy(), 0..30)
        ) {
            let statement = build_statement(Decimal::ZERO, entries);
            for pair in statement.transactions.windows(2) {
                prop_assert!(pair[0].entry.date <= pair[1].entry.date);
            }
        }
    }
}
