use chrono::Month;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One product row of the wide sales sheet: twelve monthly unit counts plus
/// the sheet's own TOTAL column.
#[derive(Debug, Clone, PartialEq)]
pub struct WideSalesRow {
    pub product: String,
    pub months: [f64; 12],
    pub total: Option<f64>,
    /// 1-based row in the source sheet, kept for issue messages.
    pub source_row: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideSalesTable {
    pub rows: Vec<WideSalesRow>,
}

/// Long-form sales: one record per (product, month).
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub product: String,
    pub month: Month,
    pub units_sold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComponent {
    pub name: String,
    pub unit_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCost {
    pub cost_type: String,
    pub monthly_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarginRecord {
    pub product: String,
    pub unit_price: f64,
    pub total_cost: f64,
    pub gross_margin: f64,
    /// `None` when the unit price is zero.
    pub gross_margin_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyMarginLine {
    pub product: String,
    pub units_sold: f64,
    pub gross_margin: f64,
    pub monthly_margin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStatus {
    /// Margin exceeds fixed costs.
    Covered,
    Short,
    /// No fixed costs to compare against.
    Undefined,
}

/// Monthly margin against fixed costs, as shown on the donut gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coverage {
    pub ratio: Option<f64>,
    /// `round(ratio, 1) * 100`, not clamped.
    pub display_pct: Option<f64>,
    /// Filled share of the donut, clamped to `[0, 100]`.
    pub gauge_fill_pct: f64,
    pub status: CoverageStatus,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopSellerRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales")]
    pub units_sold: String,
    #[serde(skip)]
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MarginRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Price")]
    #[tabled(rename = "Price")]
    pub unit_price: String,
    #[serde(rename = "TotalCost")]
    #[tabled(rename = "TotalCost")]
    pub total_cost: String,
    #[serde(rename = "GrossMargin")]
    #[tabled(rename = "GrossMargin")]
    pub gross_margin: String,
    #[serde(rename = "GrossMarginPct")]
    #[tabled(rename = "GrossMarginPct")]
    pub gross_margin_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyMarginRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "UnitsSold")]
    #[tabled(rename = "UnitsSold")]
    pub units_sold: String,
    #[serde(rename = "GrossMargin")]
    #[tabled(rename = "GrossMargin")]
    pub gross_margin: String,
    #[serde(rename = "MonthlyMargin")]
    #[tabled(rename = "MonthlyMargin")]
    pub monthly_margin: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CostComponentRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "UnitCost")]
    #[tabled(rename = "UnitCost")]
    pub unit_cost: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PriceRow {
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Price")]
    #[tabled(rename = "Price")]
    pub unit_price: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FixedCostRow {
    #[serde(rename = "CostType")]
    #[tabled(rename = "CostType")]
    pub cost_type: String,
    #[serde(rename = "MonthlyCost")]
    #[tabled(rename = "MonthlyCost")]
    pub monthly_amount: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct IssueRow {
    #[serde(rename = "Row")]
    #[tabled(rename = "Row")]
    pub row: usize,
    #[serde(rename = "Product")]
    #[tabled(rename = "Product")]
    pub product: String,
    #[serde(rename = "Column")]
    #[tabled(rename = "Column")]
    pub column: String,
    #[serde(rename = "Issue")]
    #[tabled(rename = "Issue")]
    pub issue: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub month: String,
    pub total_monthly_margin: f64,
    pub total_fixed_cost: f64,
    pub coverage: Coverage,
    pub products_without_price: Vec<String>,
    pub products_without_cost: Vec<String>,
    pub products_without_sales: Vec<String>,
    pub products_without_margin: Vec<String>,
    pub undefined_margin_pct: Vec<String>,
    pub data_issues: usize,
}
