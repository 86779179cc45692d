//! Monthly margin and fixed-cost coverage.
//!
//! The margin table is joined with one month of long-form sales; each
//! product contributes `units_sold × gross_margin`, and the total is
//! compared with the fixed monthly costs.

use crate::error::JoinMismatch;
use crate::margins::MarginReport;
use crate::months;
use crate::reshape::SalesLong;
use crate::tables::FixedCostTable;
use crate::types::{Coverage, CoverageStatus, MonthlyMarginLine};
use crate::util::inner_join;
use chrono::Month;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyMarginSummary {
    pub month: Month,
    /// Ordered by product name.
    pub lines: Vec<MonthlyMarginLine>,
    pub total_monthly_margin: f64,
    pub total_fixed_cost: f64,
    pub coverage: Coverage,
    /// `left_only`: products with a margin but no sales row.
    /// `right_only`: products sold but missing from the margin table.
    pub unmatched: JoinMismatch,
}

pub fn summarize_month(
    margins: &MarginReport,
    sales: &SalesLong,
    month: Month,
    fixed_costs: &FixedCostTable,
) -> MonthlyMarginSummary {
    let units: HashMap<&str, f64> = sales
        .for_month(month)
        .map(|r| (r.product.as_str(), r.units_sold))
        .collect();
    let (matched, unmatched) = inner_join(
        margins.records.iter().map(|r| r.product.as_str()),
        units.keys().copied(),
    );
    if !unmatched.is_empty() {
        warn!(
            "{}: {} product(s) excluded from the monthly margin (no sales: [{}], no margin: [{}])",
            months::label(month),
            unmatched.left_only.len() + unmatched.right_only.len(),
            unmatched.left_only.join(", "),
            unmatched.right_only.join(", ")
        );
    }

    let lines: Vec<MonthlyMarginLine> = matched
        .into_iter()
        .filter_map(|product| {
            let margin = margins.get(product)?;
            let units_sold = *units.get(product)?;
            Some(MonthlyMarginLine {
                product: product.to_string(),
                units_sold,
                gross_margin: margin.gross_margin,
                monthly_margin: units_sold * margin.gross_margin,
            })
        })
        .collect();

    let total_monthly_margin: f64 = lines.iter().map(|l| l.monthly_margin).sum();
    let total_fixed_cost = fixed_costs.total();
    MonthlyMarginSummary {
        month,
        lines,
        total_monthly_margin,
        total_fixed_cost,
        coverage: coverage(total_monthly_margin, total_fixed_cost),
        unmatched,
    }
}

/// `round(ratio, 1) × 100`, rounding half away from zero.
pub fn display_percentage(ratio: f64) -> f64 {
    (ratio * 10.0).round() * 10.0
}

/// Coverage of fixed costs by the monthly margin.
///
/// With no fixed costs the ratio is undefined. The gauge fill is the
/// display percentage clamped to `[0, 100]`, so a ratio above 1 shows a
/// full ring and a negative one an empty ring; the label keeps the
/// unclamped value.
pub fn coverage(total_monthly_margin: f64, total_fixed_cost: f64) -> Coverage {
    if total_fixed_cost == 0.0 {
        warn!("total fixed cost is 0, coverage ratio reported as N/A");
        return Coverage {
            ratio: None,
            display_pct: None,
            gauge_fill_pct: 0.0,
            status: CoverageStatus::Undefined,
        };
    }
    let ratio = total_monthly_margin / total_fixed_cost;
    let display_pct = display_percentage(ratio);
    Coverage {
        ratio: Some(ratio),
        display_pct: Some(display_pct),
        gauge_fill_pct: display_pct.clamp(0.0, 100.0),
        status: if ratio > 1.0 {
            CoverageStatus::Covered
        } else {
            CoverageStatus::Short
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::{drop_total, melt};
    use crate::types::{MarginRecord, WideSalesRow, WideSalesTable};

    fn margin(product: &str, gross_margin: f64) -> MarginRecord {
        MarginRecord {
            product: product.to_string(),
            unit_price: 15.0,
            total_cost: 15.0 - gross_margin,
            gross_margin,
            gross_margin_pct: Some(gross_margin / 15.0),
        }
    }

    fn sales(rows: &[(&str, usize, f64)]) -> SalesLong {
        let mut table = WideSalesTable::default();
        for (i, (product, month_index, units)) in rows.iter().enumerate() {
            let mut months = [0.0; 12];
            months[*month_index] = *units;
            table.rows.push(WideSalesRow {
                product: product.to_string(),
                months,
                total: Some(*units),
                source_row: i + 1,
            });
        }
        melt(&drop_total(&table))
    }

    fn fixed(amounts: &[f64]) -> FixedCostTable {
        let mut table = FixedCostTable::default();
        for (i, amount) in amounts.iter().enumerate() {
            table.set(&format!("cost {i}"), *amount).unwrap();
        }
        table
    }

    #[test]
    fn widget_sold_in_march() {
        let margins = MarginReport {
            records: vec![margin("Widget", 5.0)],
            unmatched: JoinMismatch::default(),
        };
        let summary = summarize_month(
            &margins,
            &sales(&[("Widget", 2, 20.0)]),
            Month::March,
            &fixed(&[150.0, 50.0]),
        );
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].monthly_margin, 100.0);
        assert_eq!(summary.total_monthly_margin, 100.0);
        assert_eq!(summary.total_fixed_cost, 200.0);
        assert_eq!(summary.coverage.ratio, Some(0.5));
        assert_eq!(summary.coverage.display_pct, Some(50.0));
        assert_eq!(summary.coverage.gauge_fill_pct, 50.0);
        assert_eq!(summary.coverage.status, CoverageStatus::Short);
    }

    #[test]
    fn other_months_contribute_nothing() {
        let margins = MarginReport {
            records: vec![margin("Widget", 5.0)],
            unmatched: JoinMismatch::default(),
        };
        let summary = summarize_month(
            &margins,
            &sales(&[("Widget", 2, 20.0)]),
            Month::April,
            &fixed(&[200.0]),
        );
        assert_eq!(summary.total_monthly_margin, 0.0);
        assert_eq!(summary.coverage.display_pct, Some(0.0));
    }

    #[test]
    fn join_exclusions_are_flagged() {
        let margins = MarginReport {
            records: vec![margin("Widget", 5.0), margin("Gadget", 2.0)],
            unmatched: JoinMismatch::default(),
        };
        let summary = summarize_month(
            &margins,
            &sales(&[("Widget", 0, 10.0), ("Doohickey", 0, 7.0)]),
            Month::January,
            &fixed(&[100.0]),
        );
        assert_eq!(summary.total_monthly_margin, 50.0);
        assert_eq!(summary.unmatched.left_only, vec!["Gadget".to_string()]);
        assert_eq!(summary.unmatched.right_only, vec!["Doohickey".to_string()]);
    }

    #[test]
    fn zero_fixed_cost_is_undefined_not_infinite() {
        let c = coverage(100.0, 0.0);
        assert_eq!(c.ratio, None);
        assert_eq!(c.display_pct, None);
        assert_eq!(c.gauge_fill_pct, 0.0);
        assert_eq!(c.status, CoverageStatus::Undefined);
    }

    #[test]
    fn gauge_clamps_but_label_does_not() {
        let over = coverage(260.0, 200.0);
        assert_eq!(over.display_pct, Some(130.0));
        assert_eq!(over.gauge_fill_pct, 100.0);
        assert_eq!(over.status, CoverageStatus::Covered);

        let under = coverage(-40.0, 200.0);
        assert_eq!(under.display_pct, Some(-20.0));
        assert_eq!(under.gauge_fill_pct, 0.0);
        assert_eq!(under.status, CoverageStatus::Short);

        let exact = coverage(200.0, 200.0);
        assert_eq!(exact.status, CoverageStatus::Short);
    }

    #[test]
    fn display_percentage_rounds_to_tenths() {
        assert_eq!(display_percentage(0.5), 50.0);
        assert_eq!(display_percentage(0.33), 30.0);
        assert_eq!(display_percentage(0.36), 40.0);
        assert_eq!(display_percentage(1.04), 100.0);
    }

    #[test]
    fn fixed_cost_total_is_the_row_sum() {
        let table = fixed(&[100.0, 50.0, 100.0, 500.0, 150.0, 100.0, 150.0, 150.0]);
        let summary = summarize_month(&MarginReport::default(), &SalesLong::default(), Month::May, &table);
        assert_eq!(summary.total_fixed_cost, 1300.0);
        assert!(summary.lines.is_empty());
    }
}
