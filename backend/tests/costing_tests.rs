//! FIFO costing tests
//!
//! Covers batch consumption ordering, COGS accumulation, shortfall
//! handling, invoice totals, and the valuation cost fallback.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::costing::{
    invoice_totals, line_amount, plan_fifo_consumption, sale_profit, BatchView,
    CostFallbackPolicy,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn batch(remaining: &str, unit_cost: &str) -> BatchView {
    BatchView {
        id: Uuid::new_v4(),
        remaining: dec(remaining),
        unit_cost: dec(unit_cost),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_single_batch_exact_consumption() {
        let batches = vec![batch("10", "4")];
        let plan = plan_fifo_consumption(&batches, dec("10")).unwrap();

        assert_eq!(plan.takes.len(), 1);
        assert_eq!(plan.takes[0].quantity, dec("10"));
        assert_eq!(plan.cogs, dec("40"));
    }

    #[test]
    fn test_consumption_spans_batches_in_order() {
        let batches = vec![batch("10", "5"), batch("5", "8")];
        let plan = plan_fifo_consumption(&batches, dec("12")).unwrap();

        assert_eq!(plan.takes.len(), 2);
        assert_eq!(plan.takes[0].batch_id, batches[0].id);
        assert_eq!(plan.takes[0].quantity, dec("10"));
        assert_eq!(plan.takes[1].batch_id, batches[1].id);
        assert_eq!(plan.takes[1].quantity, dec("2"));
        assert_eq!(plan.cogs, dec("66"));
    }

    #[test]
    fn test_oversell_is_refused_with_available_total() {
        let batches = vec![batch("10", "5"), batch("5", "8")];
        let err = plan_fifo_consumption(&batches, dec("20")).unwrap_err();

        assert_eq!(err.requested, dec("20"));
        assert_eq!(err.available, dec("15"));
    }

    #[test]
    fn test_oversell_on_empty_inventory() {
        let err = plan_fifo_consumption(&[], dec("1")).unwrap_err();
        assert_eq!(err.available, Decimal::ZERO);
    }

    #[test]
    fn test_depleted_batches_are_skipped() {
        let batches = vec![batch("0", "3"), batch("0", "4"), batch("6", "7")];
        let plan = plan_fifo_consumption(&batches, dec("5")).unwrap();

        assert_eq!(plan.takes.len(), 1);
        assert_eq!(plan.takes[0].batch_id, batches[2].id);
        assert_eq!(plan.cogs, dec("35"));
    }

    #[test]
    fn test_fractional_quantities() {
        let batches = vec![batch("2.5", "10"), batch("2.5", "12")];
        let plan = plan_fifo_consumption(&batches, dec("3.75")).unwrap();

        assert_eq!(plan.takes[0].quantity, dec("2.5"));
        assert_eq!(plan.takes[1].quantity, dec("1.25"));
        // 2.5 x 10 + 1.25 x 12
        assert_eq!(plan.cogs, dec("40"));
    }

    #[test]
    fn test_invoice_totals_standard_case() {
        let t = invoice_totals(dec("1000"), dec("50"), dec("600"));
        assert_eq!(t.sub_total, dec("1000"));
        assert_eq!(t.grand_total, dec("950"));
        assert_eq!(t.due, dec("350"));
    }

    #[test]
    fn test_over_discount_clamps_grand_total() {
        let t = invoice_totals(dec("100"), dec("200"), dec("0"));
        assert_eq!(t.grand_total, Decimal::ZERO);
        assert_eq!(t.due, Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_clamps_due() {
        let t = invoice_totals(dec("100"), dec("0"), dec("150"));
        assert_eq!(t.grand_total, dec("100"));
        assert_eq!(t.due, Decimal::ZERO);
    }

    #[test]
    fn test_sale_profit_can_be_negative() {
        // Sold below cost
        assert_eq!(sale_profit(dec("80"), dec("100")), dec("-20"));
    }

    #[test]
    fn test_cost_fallback_chain() {
        let policy = CostFallbackPolicy::LatestPurchaseThenListPrice;
        assert_eq!(policy.effective_unit_cost(dec("6"), Some(dec("5")), dec("4")), dec("6"));
        assert_eq!(policy.effective_unit_cost(dec("0"), Some(dec("5")), dec("4")), dec("5"));
        assert_eq!(policy.effective_unit_cost(dec("0"), None, dec("4")), dec("4"));
    }

    #[test]
    fn test_cost_fallback_list_price_only() {
        let policy = CostFallbackPolicy::ListPriceOnly;
        assert_eq!(policy.effective_unit_cost(dec("0"), Some(dec("5")), dec("4")), dec("4"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn batches_strategy() -> impl Strategy<Value = Vec<BatchView>> {
        prop::collection::vec((quantity_strategy(), cost_strategy()), 1..12).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(remaining, unit_cost)| BatchView {
                    id: Uuid::new_v4(),
                    remaining,
                    unit_cost,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The takes of a successful plan sum exactly to the requested
        /// quantity.
        #[test]
        fn prop_plan_conserves_quantity(
            batches in batches_strategy(),
            fraction in 1u32..=100u32
        ) {
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();
            let requested = available * Decimal::from(fraction) / Decimal::from(100);
            prop_assume!(requested > Decimal::ZERO);

            let plan = plan_fifo_consumption(&batches, requested).unwrap();
            let taken: Decimal = plan.takes.iter().map(|t| t.quantity).sum();
            prop_assert_eq!(taken, requested);
        }

        /// COGS equals the sum of take x unit_cost over the plan.
        #[test]
        fn prop_cogs_matches_takes(batches in batches_strategy()) {
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();
            prop_assume!(available > Decimal::ZERO);

            let plan = plan_fifo_consumption(&batches, available).unwrap();
            let recomputed: Decimal = plan
                .takes
                .iter()
                .map(|t| t.quantity * t.unit_cost)
                .sum();
            prop_assert_eq!(plan.cogs, recomputed);
        }

        /// COGS is bounded by the cheapest and dearest unit cost consumed.
        #[test]
        fn prop_cogs_bounded_by_cost_extremes(
            batches in batches_strategy()
        ) {
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();
            prop_assume!(available > Decimal::ZERO);

            let plan = plan_fifo_consumption(&batches, available).unwrap();
            let min_cost = batches.iter().map(|b| b.unit_cost).min().unwrap();
            let max_cost = batches.iter().map(|b| b.unit_cost).max().unwrap();

            prop_assert!(plan.cogs >= available * min_cost);
            prop_assert!(plan.cogs <= available * max_cost);
        }

        /// No take ever exceeds its batch's remaining quantity.
        #[test]
        fn prop_takes_respect_batch_limits(
            batches in batches_strategy(),
            fraction in 1u32..=100u32
        ) {
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();
            let requested = available * Decimal::from(fraction) / Decimal::from(100);
            prop_assume!(requested > Decimal::ZERO);

            let plan = plan_fifo_consumption(&batches, requested).unwrap();
            for take in &plan.takes {
                let source = batches.iter().find(|b| b.id == take.batch_id).unwrap();
                prop_assert!(take.quantity <= source.remaining);
                prop_assert!(take.quantity > Decimal::ZERO);
            }
        }

        /// A summed-availability check agrees with the planner: planning
        /// succeeds exactly when the request fits the total on hand.
        #[test]
        fn prop_availability_check_agrees_with_planner(
            batches in batches_strategy(),
            requested in quantity_strategy()
        ) {
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();
            let result = plan_fifo_consumption(&batches, requested);
            prop_assert_eq!(result.is_ok(), requested <= available);
        }

        /// Requesting more than the total always fails and reports the
        /// exact available quantity.
        #[test]
        fn prop_shortfall_reports_available(
            batches in batches_strategy(),
            extra in quantity_strategy()
        ) {
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();
            let requested = available + extra;

            let err = plan_fifo_consumption(&batches, requested).unwrap_err();
            prop_assert_eq!(err.available, available);
            prop_assert_eq!(err.requested, requested);
        }

        /// Header totals never go negative regardless of discount or
        /// payment size.
        #[test]
        fn prop_totals_never_negative(
            sub_total in cost_strategy(),
            discount in cost_strategy(),
            paid in cost_strategy()
        ) {
            let t = invoice_totals(sub_total, discount, paid);
            prop_assert!(t.grand_total >= Decimal::ZERO);
            prop_assert!(t.due >= Decimal::ZERO);
            prop_assert!(t.due <= t.grand_total);
            prop_assert!(t.grand_total <= sub_total);
        }

        /// Line amount scales linearly in quantity.
        #[test]
        fn prop_line_amount(
            quantity in quantity_strategy(),
            price in cost_strategy()
        ) {
            prop_assert_eq!(line_amount(quantity, price), quantity * price);
        }
    }
}
