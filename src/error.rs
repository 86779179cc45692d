//! Error and anomaly types.
//!
//! `LoadError` is fatal: without a sales sheet nothing downstream can run.
//! `EditError` rejects a single edit and leaves every table untouched.
//! `ValidationIssue` and `JoinMismatch` are recovered anomalies: the
//! pipeline continues with a zero-filled or reduced input and the anomaly
//! is carried along so the presentation layer can show it.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file type: '{0}' (expected xlsx, xlsm, xlsb, xls, ods or csv)")]
    UnsupportedFormat(String),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet not found: '{sheet}' (available: {})", .available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },

    #[error("Header row {header_row} is past the end of the sheet ({rows} rows)")]
    MissingHeaderRow { header_row: usize, rows: usize },

    #[error("Header has {found} columns, expected {expected} (product, 12 months, TOTAL)")]
    HeaderMismatch { expected: usize, found: usize },

    #[error("Header column {column}: '{label}' is not a month")]
    UnknownMonthHeader { column: usize, label: String },

    #[error("Header column {column}: expected {expected}, found '{found}'")]
    MonthOutOfOrder {
        column: usize,
        expected: String,
        found: String,
    },

    #[error("Last header column must be TOTAL, found '{found}'")]
    MissingTotalColumn { found: String },

    #[error("No product rows found below the header")]
    NoProducts,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("{field} must be zero or positive, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Product '{product}' has no component named '{component}'")]
    UnknownComponent { product: String, component: String },

    #[error("Product '{product}' already has a component named '{component}'")]
    DuplicateComponent { product: String, component: String },

    #[error("Unknown fixed cost type: {0}")]
    UnknownCostType(String),

    #[error("Product already exists: {0}")]
    DuplicateProduct(String),
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Cannot read seed file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid seed value: {0}")]
    Invalid(#[from] EditError),
}

/// What went wrong with a single sales cell or row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IssueKind {
    #[error("missing value, counted as 0")]
    MissingValue,

    #[error("non-numeric value '{0}', counted as 0")]
    NonNumeric(String),

    #[error("negative value {0}, counted as 0")]
    Negative(f64),

    #[error("missing TOTAL")]
    MissingTotal,

    #[error("TOTAL is {expected} but the months sum to {computed}")]
    TotalMismatch { expected: f64, computed: f64 },

    #[error("duplicate product row, skipped")]
    DuplicateProduct,

    #[error("row has data but no product name, skipped")]
    MissingProductName,
}

/// A recovered anomaly in the sales sheet, located by 1-based sheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub row: usize,
    pub product: String,
    pub column: String,
    pub kind: IssueKind,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}", self.row)?;
        if !self.product.is_empty() {
            write!(f, " ({})", self.product)?;
        }
        if !self.column.is_empty() {
            write!(f, ", {}", self.column)?;
        }
        write!(f, ": {}", self.kind)
    }
}

/// Keys an inner join dropped, per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinMismatch {
    pub left_only: Vec<String>,
    pub right_only: Vec<String>,
}

impl JoinMismatch {
    pub fn is_empty(&self) -> bool {
        self.left_only.is_empty() && self.right_only.is_empty()
    }
}
