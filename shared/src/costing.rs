//! FIFO batch costing engine
//!
//! Stock is held in cost batches, one per purchase line. A sale consumes
//! batches oldest-first and the cost of the units taken becomes the sale's
//! COGS. The planner here is pure: the caller fetches a product's open
//! batches in FIFO order, asks for a consumption plan, and applies the
//! resulting decrements inside its own storage transaction. A shortfall is
//! reported before anything is applied, so a failed consumption never leaves
//! a partial decrement behind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stock batch as seen by the planner.
///
/// `remaining` is the quantity still unconsumed in this batch; `unit_cost`
/// is the purchase cost per unit of this batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchView {
    pub id: Uuid,
    pub remaining: Decimal,
    pub unit_cost: Decimal,
}

/// One entry of a consumption plan: take `quantity` units from `batch_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTake {
    pub batch_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// The full plan for consuming a quantity FIFO, with its total cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionPlan {
    pub takes: Vec<BatchTake>,
    pub cogs: Decimal,
}

/// Requested more than the batches hold.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("insufficient stock: requested {requested}, available {available}")]
pub struct Shortfall {
    pub requested: Decimal,
    pub available: Decimal,
}

/// Plan a FIFO consumption of `quantity` units across `batches`.
///
/// `batches` must already be in FIFO order (oldest creation first, ties
/// broken by insertion order); the planner preserves that order. Batches
/// with nothing remaining are skipped. Returns [`Shortfall`] when the
/// batches together hold less than `quantity`; in that case no plan is
/// produced and the caller has nothing to roll back.
pub fn plan_fifo_consumption(
    batches: &[BatchView],
    quantity: Decimal,
) -> Result<ConsumptionPlan, Shortfall> {
    let mut still_needed = quantity;
    let mut takes = Vec::new();
    let mut cogs = Decimal::ZERO;

    for batch in batches {
        if still_needed <= Decimal::ZERO {
            break;
        }
        if batch.remaining <= Decimal::ZERO {
            continue;
        }

        let take = batch.remaining.min(still_needed);
        cogs += take * batch.unit_cost;
        takes.push(BatchTake {
            batch_id: batch.id,
            quantity: take,
            unit_cost: batch.unit_cost,
        });
        still_needed -= take;
    }

    if still_needed > Decimal::ZERO {
        let available: Decimal = batches
            .iter()
            .map(|b| b.remaining.max(Decimal::ZERO))
            .sum();
        return Err(Shortfall {
            requested: quantity,
            available,
        });
    }

    Ok(ConsumptionPlan { takes, cogs })
}

/// Fallback policy for valuing batches whose own unit cost is zero/missing.
///
/// Which price stands in for a costless batch is a business choice, so it is
/// configurable rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFallbackPolicy {
    /// Most recent recorded purchase price, then the product's list price.
    #[default]
    LatestPurchaseThenListPrice,
    /// The product's list price only.
    ListPriceOnly,
    /// Value costless batches at zero.
    Zero,
}

impl CostFallbackPolicy {
    /// Resolve the unit cost to value a batch at.
    ///
    /// A positive batch cost always wins; the policy only decides what
    /// replaces a zero or negative one.
    pub fn effective_unit_cost(
        &self,
        batch_cost: Decimal,
        latest_purchase_price: Option<Decimal>,
        list_price: Decimal,
    ) -> Decimal {
        if batch_cost > Decimal::ZERO {
            return batch_cost;
        }
        match self {
            CostFallbackPolicy::LatestPurchaseThenListPrice => latest_purchase_price
                .filter(|p| *p > Decimal::ZERO)
                .unwrap_or(list_price),
            CostFallbackPolicy::ListPriceOnly => list_price,
            CostFallbackPolicy::Zero => Decimal::ZERO,
        }
    }
}

/// Header totals derived from an invoice's line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub sub_total: Decimal,
    pub grand_total: Decimal,
    pub due: Decimal,
}

/// Compute invoice header totals.
///
/// `grand_total = max(0, sub_total - discount)` and
/// `due = max(0, grand_total - paid)`; over-discounting or over-paying never
/// produces a negative header figure.
pub fn invoice_totals(sub_total: Decimal, discount: Decimal, paid: Decimal) -> InvoiceTotals {
    let grand_total = (sub_total - discount).max(Decimal::ZERO);
    let due = (grand_total - paid).max(Decimal::ZERO);
    InvoiceTotals {
        sub_total,
        grand_total,
        due,
    }
}

/// Line amount for an invoice item.
pub fn line_amount(quantity: Decimal, price: Decimal) -> Decimal {
    quantity * price
}

/// Invoice-level profit for a sale: `grand_total - cogs_total`.
pub fn sale_profit(grand_total: Decimal, cogs_total: Decimal) -> Decimal {
    grand_total - cogs_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

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

    #[test]
    fn consumes_oldest_batch_first() {
        let batches = vec![batch("10", "5"), batch("5", "8")];
        let plan = plan_fifo_consumption(&batches, dec("12")).unwrap();

        assert_eq!(plan.takes.len(), 2);
        assert_eq!(plan.takes[0].batch_id, batches[0].id);
        assert_eq!(plan.takes[0].quantity, dec("10"));
        assert_eq!(plan.takes[1].quantity, dec("2"));
        // 10 x 5 + 2 x 8
        assert_eq!(plan.cogs, dec("66"));
    }

    #[test]
    fn shortfall_reports_available_total() {
        let batches = vec![batch("10", "5"), batch("5", "8")];
        let err = plan_fifo_consumption(&batches, dec("20")).unwrap_err();
        assert_eq!(err.requested, dec("20"));
        assert_eq!(err.available, dec("15"));
    }

    #[test]
    fn skips_empty_batches() {
        let batches = vec![batch("0", "5"), batch("4", "7")];
        let plan = plan_fifo_consumption(&batches, dec("3")).unwrap();
        assert_eq!(plan.takes.len(), 1);
        assert_eq!(plan.takes[0].batch_id, batches[1].id);
        assert_eq!(plan.cogs, dec("21"));
    }

    #[test]
    fn fallback_policy_prefers_batch_cost() {
        let policy = CostFallbackPolicy::LatestPurchaseThenListPrice;
        assert_eq!(
            policy.effective_unit_cost(dec("9"), Some(dec("4")), dec("2")),
            dec("9")
        );
        assert_eq!(
            policy.effective_unit_cost(dec("0"), Some(dec("4")), dec("2")),
            dec("4")
        );
        assert_eq!(
            policy.effective_unit_cost(dec("0"), None, dec("2")),
            dec("2")
        );
        assert_eq!(
            CostFallbackPolicy::Zero.effective_unit_cost(dec("0"), Some(dec("4")), dec("2")),
            Decimal::ZERO
        );
    }

    #[test]
    fn totals_clamp_at_zero() {
        let t = invoice_totals(dec("100"), dec("150"), dec("10"));
        assert_eq!(t.grand_total, Decimal::ZERO);
        assert_eq!(t.due, Decimal::ZERO);

        let t = invoice_totals(dec("100"), dec("20"), dec("30"));
        assert_eq!(t.grand_total, dec("80"));
        assert_eq!(t.due, dec("50"));
    }
}
