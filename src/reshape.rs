//! Wide-to-long reshape of the sales sheet.
//!
//! `drop_total` yields the product × month matrix the heatmap shows;
//! `melt` turns it into one `SalesRecord` per (product, month), the form
//! the monthly margin join and the top-sellers list work on.

use crate::error::{IssueKind, ValidationIssue};
use crate::loader::TOTAL_COLUMN;
use crate::months::{self, MONTHS};
use crate::types::{SalesRecord, WideSalesTable};
use chrono::Month;
use log::warn;
use std::cmp::Ordering;
use std::collections::BTreeMap;

const TOTAL_TOLERANCE: f64 = 1e-6;

/// The wide table with the TOTAL column dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesMatrix {
    pub rows: Vec<(String, [f64; 12])>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesLong {
    records: Vec<SalesRecord>,
}

impl SalesLong {
    pub fn for_month(&self, month: Month) -> impl Iterator<Item = &SalesRecord> {
        self.records.iter().filter(move |r| r.month == month)
    }

    /// Sales of `month`, best sellers first; ties keep name order.
    pub fn top_sellers(&self, month: Month) -> Vec<&SalesRecord> {
        let mut rows: Vec<&SalesRecord> = self.for_month(month).collect();
        rows.sort_by(|a, b| {
            b.units_sold
                .partial_cmp(&a.units_sold)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.product.cmp(&b.product))
        });
        rows
    }

    /// Highest monthly unit count across all products and months.
    pub fn max_units(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.units_sold)
            .fold(0.0, f64::max)
    }

    pub fn totals_by_product(&self) -> BTreeMap<&str, f64> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for r in &self.records {
            *totals.entry(r.product.as_str()).or_insert(0.0) += r.units_sold;
        }
        totals
    }
}

pub fn drop_total(table: &WideSalesTable) -> SalesMatrix {
    SalesMatrix {
        rows: table
            .rows
            .iter()
            .map(|r| (r.product.clone(), r.months))
            .collect(),
    }
}

/// Melt the matrix: exactly twelve records per product, product-major.
pub fn melt(matrix: &SalesMatrix) -> SalesLong {
    let records = matrix
        .rows
        .iter()
        .flat_map(|(product, values)| {
            MONTHS.iter().map(move |month| SalesRecord {
                product: product.clone(),
                month: *month,
                units_sold: values[months::index(*month)],
            })
        })
        .collect();
    SalesLong { records }
}

/// Compare each row's TOTAL with the sum of its melted months.
pub fn check_totals(table: &WideSalesTable, long: &SalesLong) -> Vec<ValidationIssue> {
    let sums = long.totals_by_product();
    let mut issues = Vec::new();
    for row in &table.rows {
        let (Some(expected), Some(computed)) = (row.total, sums.get(row.product.as_str())) else {
            continue;
        };
        if (expected - computed).abs() > TOTAL_TOLERANCE {
            warn!(
                "{}: TOTAL {} differs from monthly sum {}",
                row.product, expected, computed
            );
            issues.push(ValidationIssue {
                row: row.source_row,
                product: row.product.clone(),
                column: TOTAL_COLUMN.to_string(),
                kind: IssueKind::TotalMismatch {
                    expected,
                    computed: *computed,
                },
            });
        }
    }
    issues
}

/// Sales data for a session: built once at load time, never edited.
#[derive(Debug, Clone, Default)]
pub struct SalesData {
    matrix: SalesMatrix,
    long: SalesLong,
    issues: Vec<ValidationIssue>,
}

impl SalesData {
    /// Run the reshape stage, folding the loader's issues together with
    /// any TOTAL mismatches.
    pub fn prepare(table: &WideSalesTable, load_issues: Vec<ValidationIssue>) -> Self {
        let matrix = drop_total(table);
        let long = melt(&matrix);
        let mut issues = load_issues;
        issues.extend(check_totals(table, &long));
        issues.sort_by_key(|i| i.row);
        SalesData {
            matrix,
            long,
            issues,
        }
    }

    pub fn matrix(&self) -> &SalesMatrix {
        &self.matrix
    }

    pub fn long(&self) -> &SalesLong {
        &self.long
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WideSalesRow;

    fn row(product: &str, months: [f64; 12], total: Option<f64>, source_row: usize) -> WideSalesRow {
        WideSalesRow {
            product: product.to_string(),
            months,
            total,
            source_row,
        }
    }

    fn sample() -> WideSalesTable {
        let serum = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut spray = [0.0; 12];
        spray[2] = 20.0;
        spray[7] = 4.5;
        WideSalesTable {
            rows: vec![
                row("Serum", serum, Some(78.0), 4),
                row("Hair Spray", spray, Some(24.5), 5),
                row("Curl Booster 150mL", [3.0; 12], Some(36.0), 6),
            ],
        }
    }

    #[test]
    fn melt_yields_twelve_records_per_product() {
        let long = melt(&drop_total(&sample()));
        assert_eq!(long.records.len(), 36);
        let serum: Vec<&SalesRecord> = long.records.iter().filter(|r| r.product == "Serum").collect();
        assert_eq!(serum.len(), 12);
        assert_eq!(serum[0].month, Month::January);
        assert_eq!(serum[11].month, Month::December);
        assert_eq!(serum[11].units_sold, 12.0);
    }

    #[test]
    fn regrouping_the_long_table_gives_back_each_total() {
        let table = sample();
        let long = melt(&drop_total(&table));
        let totals = long.totals_by_product();
        for r in &table.rows {
            assert_eq!(Some(totals[r.product.as_str()]), r.total);
        }
        assert!(check_totals(&table, &long).is_empty());
    }

    #[test]
    fn total_mismatch_is_reported() {
        let mut table = sample();
        table.rows[0].total = Some(80.0);
        let data = SalesData::prepare(&table, Vec::new());
        assert_eq!(data.issues().len(), 1);
        assert_eq!(data.issues()[0].row, 4);
        assert_eq!(
            data.issues()[0].kind,
            IssueKind::TotalMismatch {
                expected: 80.0,
                computed: 78.0
            }
        );
    }

    #[test]
    fn top_sellers_sort_descending_with_name_ties() {
        let long = melt(&drop_total(&sample()));
        let march: Vec<(&str, f64)> = long
            .top_sellers(Month::March)
            .iter()
            .map(|r| (r.product.as_str(), r.units_sold))
            .collect();
        assert_eq!(
            march,
            vec![("Hair Spray", 20.0), ("Curl Booster 150mL", 3.0), ("Serum", 3.0)]
        );
        assert_eq!(long.max_units(), 20.0);
    }

    #[test]
    fn matrix_keeps_product_order() {
        let matrix = drop_total(&sample());
        let products: Vec<&str> = matrix.rows.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(products, vec!["Serum", "Hair Spray", "Curl Booster 150mL"]);
    }
}
