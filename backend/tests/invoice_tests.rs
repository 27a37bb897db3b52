//! Invoice input validation and totals tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::costing::{invoice_totals, line_amount, sale_profit};
use shared::validation::{
    validate_amount, validate_items_not_empty, validate_name, validate_quantity,
    validate_unit_price,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_invoice_rejected() {
        assert!(validate_items_not_empty(0).is_err());
        assert!(validate_items_not_empty(1).is_ok());
    }

    #[test]
    fn test_zero_and_negative_quantity_rejected() {
        assert!(validate_quantity(Decimal::ZERO).is_err());
        assert!(validate_quantity(dec("-3")).is_err());
        assert!(validate_quantity(dec("0.0001")).is_ok());
    }

    #[test]
    fn test_free_items_allowed() {
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(dec("-0.01")).is_err());
    }

    #[test]
    fn test_negative_discount_and_payment_rejected() {
        assert!(validate_amount(dec("-1")).is_err());
        assert!(validate_amount(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_blank_party_name_rejected() {
        assert!(validate_name("").is_err());
        assert!(validate_name("  \t ").is_err());
        assert!(validate_name("Acme Traders").is_ok());
    }

    #[test]
    fn test_sub_total_is_sum_of_line_amounts() {
        let lines = [(dec("3"), dec("10")), (dec("2"), dec("4.5"))];
        let sub_total: Decimal = lines.iter().map(|(q, p)| line_amount(*q, *p)).sum();
        assert_eq!(sub_total, dec("39"));

        let totals = invoice_totals(sub_total, dec("4"), dec("20"));
        assert_eq!(totals.grand_total, dec("35"));
        assert_eq!(totals.due, dec("15"));
    }

    #[test]
    fn test_profit_uses_grand_total_not_sub_total() {
        // Discount reduces profit because profit is grand_total - cogs
        let totals = invoice_totals(dec("100"), dec("10"), Decimal::ZERO);
        assert_eq!(sale_profit(totals.grand_total, dec("60")), dec("30"));
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

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Discount and payment can only shrink the figures they apply
        /// to, never flip signs.
        #[test]
        fn prop_discount_and_paid_monotonic(
            sub_total in amount_strategy(),
            discount in amount_strategy(),
            paid in amount_strategy()
        ) {
            let t = invoice_totals(sub_total, discount, paid);
            let undiscounted = invoice_totals(sub_total, Decimal::ZERO, paid);

            prop_assert!(t.grand_total <= undiscounted.grand_total);
            prop_assert!(t.due <= t.grand_total);
        }

        /// Profit of a fully-discounted sale is exactly minus its COGS.
        #[test]
        fn prop_full_discount_profit_is_negative_cogs(
            sub_total in amount_strategy(),
            cogs in amount_strategy()
        ) {
            let t = invoice_totals(sub_total, sub_total, Decimal::ZERO);
            prop_assert_eq!(t.grand_total, Decimal::ZERO);
            prop_assert_eq!(sale_profit(t.grand_total, cogs), -cogs);
        }
    }
}
