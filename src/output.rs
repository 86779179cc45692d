use crate::types::{Coverage, CoverageStatus};
use crate::util::format_number;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

const GAUGE_WIDTH: usize = 20;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Print a grid whose first row is the header.
pub fn preview_grid(grid: Vec<Vec<String>>) {
    if grid.len() < 2 {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    for row in grid {
        builder.push_record(row);
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Text rendering of the coverage donut: the filled share of the ring as a
/// bar, followed by the unclamped percentage label.
pub fn render_gauge(coverage: &Coverage) -> String {
    let Some(pct) = coverage.display_pct else {
        return format!("[{}] N/A (no fixed costs)", " ".repeat(GAUGE_WIDTH));
    };
    let filled = ((coverage.gauge_fill_pct / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    let color = match coverage.status {
        CoverageStatus::Covered => "green",
        CoverageStatus::Short => "red",
        CoverageStatus::Undefined => "grey",
    };
    format!(
        "[{}{}] {} % ({})",
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled),
        format_number(pct, 0),
        color
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monthly::coverage;
    use crate::types::PriceRow;
    use tempfile::TempDir;

    #[test]
    fn gauge_fill_is_clamped_and_label_is_not() {
        assert_eq!(
            render_gauge(&coverage(100.0, 200.0)),
            format!("[{}{}] 50 % (red)", "#".repeat(10), "-".repeat(10))
        );
        assert_eq!(
            render_gauge(&coverage(300.0, 200.0)),
            format!("[{}] 150 % (green)", "#".repeat(20))
        );
        assert_eq!(
            render_gauge(&coverage(-50.0, 200.0)),
            format!("[{}] -30 % (red)", "-".repeat(20))
        );
        assert!(render_gauge(&coverage(10.0, 0.0)).contains("N/A"));
    }

    #[test]
    fn csv_export_uses_serde_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.csv");
        let rows = vec![PriceRow {
            product: "Serum".to_string(),
            unit_price: "30.00".to_string(),
        }];
        write_csv(&path, &rows).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Product,Price\nSerum,30.00\n");
    }
}
