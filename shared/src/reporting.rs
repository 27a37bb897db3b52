//! Financial snapshot arithmetic
//!
//! Pure assembly of the balance sheet and P&L figures from sums the backend
//! pulls out of storage. Keeping the arithmetic here means the accounting
//! identities (assets = cash + A/R + inventory, equity = assets -
//! liabilities, margin rules) are testable without a database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::DateRange;

/// One period of the P&L series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlRow {
    pub period: String,
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    /// Gross margin percentage; 0 when there is no revenue.
    pub margin: Decimal,
}

impl PnlRow {
    pub fn from_sums(period: String, revenue: Decimal, cogs: Decimal) -> Self {
        let gross_profit = revenue - cogs;
        let margin = if revenue > Decimal::ZERO {
            gross_profit / revenue * Decimal::from(100)
        } else {
            Decimal::ZERO
        };
        Self {
            period,
            revenue,
            cogs,
            gross_profit,
            margin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheetAssets {
    pub cash: Decimal,
    pub accounts_receivable: Decimal,
    pub inventory: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheetLiabilities {
    pub accounts_payable: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheetEquity {
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlSummary {
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub other_expenses: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
}

/// Point-in-time balance sheet with a P&L block for an accompanying period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub assets: BalanceSheetAssets,
    pub liabilities: BalanceSheetLiabilities,
    pub equity: BalanceSheetEquity,
    pub period: DateRange,
    pub pnl: PnlSummary,
}

/// Raw sums feeding a balance sheet, all cut off at the as-of date except the
/// period figures, which cover the P&L window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BalanceSheetInputs {
    pub customer_payments: Decimal,
    pub supplier_payments: Decimal,
    pub sales_total: Decimal,
    pub purchases_total: Decimal,
    pub inventory_value: Decimal,
    pub period_revenue: Decimal,
    pub period_cogs: Decimal,
}

/// Assemble a balance sheet from its input sums.
///
/// Cash is receipts minus disbursements; A/R and A/P are invoice totals net
/// of payments, clamped at zero. There is no expense model, so net profit
/// equals gross profit.
pub fn build_balance_sheet(
    as_of: NaiveDate,
    period: DateRange,
    inputs: BalanceSheetInputs,
) -> BalanceSheet {
    let cash = inputs.customer_payments - inputs.supplier_payments;
    let accounts_receivable =
        (inputs.sales_total - inputs.customer_payments).max(Decimal::ZERO);
    let accounts_payable =
        (inputs.purchases_total - inputs.supplier_payments).max(Decimal::ZERO);

    let assets_total = cash + accounts_receivable + inputs.inventory_value;
    let liabilities_total = accounts_payable;
    let equity_total = assets_total - liabilities_total;

    let gross_profit = inputs.period_revenue - inputs.period_cogs;
    let other_expenses = Decimal::ZERO;

    BalanceSheet {
        as_of,
        assets: BalanceSheetAssets {
            cash,
            accounts_receivable,
            inventory: inputs.inventory_value,
            total: assets_total,
        },
        liabilities: BalanceSheetLiabilities {
            accounts_payable,
            total: liabilities_total,
        },
        equity: BalanceSheetEquity {
            total: equity_total,
        },
        period,
        pnl: PnlSummary {
            revenue: inputs.period_revenue,
            cogs: inputs.period_cogs,
            other_expenses,
            gross_profit,
            net_profit: gross_profit - other_expenses,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_period() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    #[test]
    fn identities_hold() {
        let sheet = build_balance_sheet(
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            sample_period(),
            BalanceSheetInputs {
                customer_payments: dec("700"),
                supplier_payments: dec("300"),
                sales_total: dec("1000"),
                purchases_total: dec("500"),
                inventory_value: dec("250"),
                period_revenue: dec("1000"),
                period_cogs: dec("400"),
            },
        );

        assert_eq!(sheet.assets.cash, dec("400"));
        assert_eq!(sheet.assets.accounts_receivable, dec("300"));
        assert_eq!(sheet.liabilities.accounts_payable, dec("200"));
        assert_eq!(
            sheet.assets.total,
            sheet.assets.cash + sheet.assets.accounts_receivable + sheet.assets.inventory
        );
        assert_eq!(
            sheet.equity.total,
            sheet.assets.total - sheet.liabilities.total
        );
        assert_eq!(sheet.pnl.gross_profit, dec("600"));
        assert_eq!(sheet.pnl.net_profit, dec("600"));
    }

    #[test]
    fn receivable_and_payable_clamp_at_zero() {
        let sheet = build_balance_sheet(
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            sample_period(),
            BalanceSheetInputs {
                customer_payments: dec("1200"),
                supplier_payments: dec("900"),
                sales_total: dec("1000"),
                purchases_total: dec("500"),
                ..Default::default()
            },
        );

        assert_eq!(sheet.assets.accounts_receivable, Decimal::ZERO);
        assert_eq!(sheet.liabilities.accounts_payable, Decimal::ZERO);
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        let row = PnlRow::from_sums("2024-03".into(), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(row.margin, Decimal::ZERO);

        let row = PnlRow::from_sums("2024-04".into(), dec("200"), dec("150"));
        assert_eq!(row.gross_profit, dec("50"));
        assert_eq!(row.margin, dec("25"));
    }
}
