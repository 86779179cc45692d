use crate::error::{IssueKind, LoadError, ValidationIssue};
use crate::months::{self, MONTHS};
use crate::types::{WideSalesRow, WideSalesTable};
use crate::util::parse_f64_safe;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;

pub const TOTAL_COLUMN: &str = "TOTAL";

/// Product column, twelve months, TOTAL.
const EXPECTED_COLUMNS: usize = 14;
const TOTAL_INDEX: usize = EXPECTED_COLUMNS - 1;

/// A spreadsheet cell after the source-specific typing is stripped away.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Type a raw text cell, reading it as a number when it parses as one.
    pub fn from_text(s: &str) -> Cell {
        let s = s.trim();
        if s.is_empty() {
            return Cell::Empty;
        }
        match parse_f64_safe(Some(s)) {
            Some(v) => Cell::Number(v),
            None => Cell::Text(s.to_string()),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell as header/label text.
    fn label(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Non-blank rows below the header.
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub issues: Vec<ValidationIssue>,
}

/// Load the wide sales table from a workbook sheet or a CSV file.
///
/// `header_row` is the 0-based index of the header row; rows above it are
/// ignored. `sheet` is ignored for CSV input.
pub fn load_sales(
    path: &Path,
    header_row: usize,
    sheet: &str,
) -> Result<(WideSalesTable, LoadReport), LoadError> {
    if !path.is_file() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let grid = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, sheet)?,
        "csv" => {
            debug!("CSV input, ignoring sheet name '{}'", sheet);
            read_csv(path)?
        }
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    debug!("read {} raw rows from {}", grid.len(), path.display());
    parse_grid(&grid, header_row)
}

fn read_workbook(path: &Path, sheet: &str) -> Result<Vec<Vec<Cell>>, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let available = workbook.sheet_names();
    if !available.iter().any(|s| s == sheet) {
        return Err(LoadError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }
    let range = workbook.worksheet_range(sheet)?;

    // The range starts at the first used cell; pad it back to A1 so the
    // header row offset counts from the top of the sheet.
    let (row_pad, col_pad) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); row_pad];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_pad];
        cells.extend(row.iter().map(cell_from_data));
        grid.push(cells);
    }
    Ok(grid)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::String(s) => Cell::from_text(s),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
    }
}

fn read_csv(path: &Path) -> Result<Vec<Vec<Cell>>, LoadError> {
    let content = std::fs::read_to_string(path)?;
    // Spreadsheets saved from a French locale use `;` between fields.
    let sample: String = content.lines().take(10).collect();
    let delimiter = if sample.matches(';').count() > sample.matches(',').count() {
        b';'
    } else {
        b','
    };
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());
    let mut grid = Vec::new();
    for record in rdr.records() {
        let record = record?;
        grid.push(record.iter().map(Cell::from_text).collect());
    }
    Ok(grid)
}

/// Turn a raw cell grid into the wide sales table.
///
/// The header must name the product column, the twelve months in calendar
/// order and TOTAL. Cell problems below the header never fail the load:
/// missing, non-numeric or negative month values count as zero and are
/// recorded in the report.
pub fn parse_grid(
    grid: &[Vec<Cell>],
    header_row: usize,
) -> Result<(WideSalesTable, LoadReport), LoadError> {
    let header = grid.get(header_row).ok_or(LoadError::MissingHeaderRow {
        header_row,
        rows: grid.len(),
    })?;
    validate_header(header)?;

    let mut table = WideSalesTable::default();
    let mut report = LoadReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (offset, row) in grid.iter().enumerate().skip(header_row + 1) {
        let source_row = offset + 1;
        if row.iter().take(EXPECTED_COLUMNS).all(Cell::is_empty) {
            continue;
        }
        report.total_rows += 1;

        let product = row.first().map(Cell::label).unwrap_or_default();
        let product = product.trim().to_string();
        if product.is_empty() {
            report.skipped_rows += 1;
            report.issues.push(ValidationIssue {
                row: source_row,
                product: String::new(),
                column: String::new(),
                kind: IssueKind::MissingProductName,
            });
            continue;
        }
        if product.eq_ignore_ascii_case(TOTAL_COLUMN) {
            info!("row {}: skipping sheet footer '{}'", source_row, product);
            report.skipped_rows += 1;
            continue;
        }
        if !seen.insert(product.clone()) {
            report.skipped_rows += 1;
            report.issues.push(ValidationIssue {
                row: source_row,
                product,
                column: String::new(),
                kind: IssueKind::DuplicateProduct,
            });
            continue;
        }

        let mut months = [0.0; 12];
        for (i, month) in MONTHS.iter().enumerate() {
            let (units, issue) = read_units(row.get(i + 1));
            months[i] = units;
            if let Some(kind) = issue {
                report.issues.push(ValidationIssue {
                    row: source_row,
                    product: product.clone(),
                    column: months::label(*month).to_string(),
                    kind,
                });
            }
        }

        let total = match row.get(TOTAL_INDEX) {
            Some(Cell::Number(v)) if v.is_finite() => Some(*v),
            _ => {
                report.issues.push(ValidationIssue {
                    row: source_row,
                    product: product.clone(),
                    column: TOTAL_COLUMN.to_string(),
                    kind: IssueKind::MissingTotal,
                });
                None
            }
        };

        table.rows.push(WideSalesRow {
            product,
            months,
            total,
            source_row,
        });
    }

    if table.rows.is_empty() {
        return Err(LoadError::NoProducts);
    }
    report.loaded_rows = table.rows.len();
    if !report.issues.is_empty() {
        warn!(
            "{} data issue(s) recovered while loading sales",
            report.issues.len()
        );
    }
    Ok((table, report))
}

fn validate_header(header: &[Cell]) -> Result<(), LoadError> {
    let width = header
        .iter()
        .rposition(|c| !c.is_empty())
        .map_or(0, |i| i + 1);
    if width != EXPECTED_COLUMNS {
        return Err(LoadError::HeaderMismatch {
            expected: EXPECTED_COLUMNS,
            found: width,
        });
    }
    // The product column's own header text is irrelevant; only its position
    // matters.
    for (i, expected) in MONTHS.iter().enumerate() {
        let column = i + 1;
        let label = header[column].label();
        match months::parse_label(&label) {
            None => return Err(LoadError::UnknownMonthHeader { column, label }),
            Some(found) if found != *expected => {
                return Err(LoadError::MonthOutOfOrder {
                    column,
                    expected: months::label(*expected).to_string(),
                    found: label,
                })
            }
            Some(_) => {}
        }
    }
    let total = header[TOTAL_INDEX].label();
    if !total.trim().eq_ignore_ascii_case(TOTAL_COLUMN) {
        return Err(LoadError::MissingTotalColumn { found: total });
    }
    Ok(())
}

fn read_units(cell: Option<&Cell>) -> (f64, Option<IssueKind>) {
    match cell {
        None | Some(Cell::Empty) => (0.0, Some(IssueKind::MissingValue)),
        Some(Cell::Text(s)) => (0.0, Some(IssueKind::NonNumeric(s.clone()))),
        Some(Cell::Number(v)) if !v.is_finite() || *v < 0.0 => {
            (0.0, Some(IssueKind::Negative(*v)))
        }
        Some(Cell::Number(v)) => (*v, None),
    }
}
