//! Tabular view output
//!
//! Every cell carries its display text and, where one exists, the value it
//! was formatted from. Sorting and numeric filtering only look at the raw
//! value; presentation only looks at the display text.

use crate::core::views::format::{format_rupiah, parse_stored_date};
use crate::domain::row::format_plain_number;
use crate::domain::CellValue;
use chrono::NaiveDate;
use serde::Serialize;

/// One output cell
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Cell {
    /// Text shown to the user
    pub display: String,

    /// Underlying number for numeric and currency cells
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<f64>,

    /// Parsed calendar date for date cells
    #[serde(skip)]
    pub date: Option<NaiveDate>,
}

impl Cell {
    /// Empty cell
    pub fn empty() -> Self {
        Self::default()
    }

    /// Plain text cell
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            display: value.into(),
            ..Self::default()
        }
    }

    /// Number shown without grouping
    pub fn number(value: f64) -> Self {
        Self {
            display: format_plain_number(value),
            numeric: Some(value),
            date: None,
        }
    }

    /// Number shown as rupiah
    pub fn currency(value: f64) -> Self {
        Self {
            display: format_rupiah(value),
            numeric: Some(value),
            date: None,
        }
    }

    /// Stored date, kept verbatim for display
    pub fn date(value: impl Into<String>) -> Self {
        let display = value.into();
        let date = parse_stored_date(&display);
        Self {
            display,
            numeric: None,
            date,
        }
    }

    /// Cell for a raw stored value
    pub fn from_value(value: Option<&CellValue>) -> Self {
        match value {
            Some(CellValue::Number(v)) if v.is_finite() => Self::number(*v),
            Some(CellValue::Text(s)) => Self::text(s.clone()),
            _ => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty() && self.numeric.is_none()
    }
}

/// Ordered columns plus ordered rows of cells
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ViewTable {
    /// Empty table with the given header
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column in the header
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell at `row`, `column`
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Keeps the first `limit` rows; 0 keeps everything
    pub fn truncate(&mut self, limit: usize) {
        if limit > 0 {
            self.rows.truncate(limit);
        }
    }

    /// Rows as display strings
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.display.clone()).collect())
            .collect()
    }
}
