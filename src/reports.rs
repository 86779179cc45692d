use crate::error::ValidationIssue;
use crate::margins::MarginReport;
use crate::months::{self, MONTHS};
use crate::monthly::MonthlyMarginSummary;
use crate::reshape::{SalesLong, SalesMatrix};
use crate::session::Session;
use crate::tables::{CostTable, FixedCostTable, PriceTable};
use crate::types::{
    CostComponentRow, FixedCostRow, IssueRow, MarginRow, MonthlyMarginRow, PriceRow,
    SummaryStats, TopSellerRow,
};
use crate::util::{format_number, format_optional, progress_bar};
use chrono::Month;

const BAR_WIDTH: usize = 20;

/// Product × month grid for the heatmap: a header row, then one row per
/// product with its twelve monthly unit counts.
pub fn heatmap_grid(matrix: &SalesMatrix) -> Vec<Vec<String>> {
    let mut header = vec!["Product".to_string()];
    header.extend(MONTHS.iter().map(|m| months::label(*m).to_string()));
    let mut grid = vec![header];
    for (product, values) in &matrix.rows {
        let mut row = vec![product.clone()];
        row.extend(values.iter().map(|v| format_number(*v, 0)));
        grid.push(row);
    }
    grid
}

/// Best sellers of `month`. The bar scales to the highest monthly count of
/// the whole year so months can be compared by eye.
pub fn top_seller_rows(sales: &SalesLong, month: Month) -> Vec<TopSellerRow> {
    let max = sales.max_units();
    sales
        .top_sellers(month)
        .into_iter()
        .map(|r| TopSellerRow {
            product: r.product.clone(),
            units_sold: format_number(r.units_sold, 0),
            bar: progress_bar(r.units_sold, max, BAR_WIDTH),
        })
        .collect()
}

pub fn margin_rows(report: &MarginReport) -> Vec<MarginRow> {
    report
        .records
        .iter()
        .map(|r| MarginRow {
            product: r.product.clone(),
            unit_price: format_number(r.unit_price, 2),
            total_cost: format_number(r.total_cost, 3),
            gross_margin: format_number(r.gross_margin, 3),
            gross_margin_pct: format_optional(r.gross_margin_pct.map(|p| p * 100.0), 1),
        })
        .collect()
}

pub fn monthly_rows(summary: &MonthlyMarginSummary) -> Vec<MonthlyMarginRow> {
    summary
        .lines
        .iter()
        .map(|l| MonthlyMarginRow {
            product: l.product.clone(),
            units_sold: format_number(l.units_sold, 0),
            gross_margin: format_number(l.gross_margin, 3),
            monthly_margin: format_number(l.monthly_margin, 2),
        })
        .collect()
}

pub fn cost_component_rows(costs: &CostTable) -> Vec<CostComponentRow> {
    let mut rows = Vec::new();
    for product in costs.products() {
        let components = costs.components(product).unwrap_or_default();
        if components.is_empty() {
            rows.push(CostComponentRow {
                product: product.to_string(),
                component: "(none)".to_string(),
                unit_cost: format_number(0.0, 3),
            });
        }
        for c in components {
            rows.push(CostComponentRow {
                product: product.to_string(),
                component: c.name.clone(),
                unit_cost: format_number(c.unit_cost, 3),
            });
        }
        rows.push(CostComponentRow {
            product: product.to_string(),
            component: "= total_cost".to_string(),
            unit_cost: format_number(costs.total_cost(product).unwrap_or(0.0), 3),
        });
    }
    rows
}

pub fn price_rows(prices: &PriceTable) -> Vec<PriceRow> {
    prices
        .entries()
        .map(|(product, price)| PriceRow {
            product: product.to_string(),
            unit_price: format_number(price, 2),
        })
        .collect()
}

pub fn fixed_cost_rows(fixed: &FixedCostTable) -> Vec<FixedCostRow> {
    fixed
        .rows()
        .iter()
        .map(|r| FixedCostRow {
            cost_type: r.cost_type.clone(),
            monthly_amount: format_number(r.monthly_amount, 2),
        })
        .collect()
}

pub fn issue_rows(issues: &[ValidationIssue]) -> Vec<IssueRow> {
    issues
        .iter()
        .map(|i| IssueRow {
            row: i.row,
            product: i.product.clone(),
            column: i.column.clone(),
            issue: i.kind.to_string(),
        })
        .collect()
}

pub fn generate_summary(session: &Session) -> SummaryStats {
    let margins = session.margins();
    let monthly = session.monthly();
    SummaryStats {
        month: months::label(monthly.month).to_string(),
        total_monthly_margin: monthly.total_monthly_margin,
        total_fixed_cost: monthly.total_fixed_cost,
        coverage: monthly.coverage,
        products_without_price: margins.unmatched.left_only.clone(),
        products_without_cost: margins.unmatched.right_only.clone(),
        products_without_sales: monthly.unmatched.left_only.clone(),
        products_without_margin: monthly.unmatched.right_only.clone(),
        undefined_margin_pct: margins.undefined_pct(),
        data_issues: session.issues().len(),
    }
}
