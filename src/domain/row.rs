//! Row-oriented claim data model
//!
//! A [`Dataset`] is the unit loaded from one file: an ordered header plus
//! [`ClaimRow`]s keyed by column name. Rows are accessed generically through
//! [`ClaimRow::get`], with typed accessors for the columns the pipeline relies on.

use crate::domain::columns;
use crate::domain::ids::{CaseMixCode, ClaimId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strings treated as "no value" after trimming
const NULL_SENTINELS: &[&str] = &["None", "none", "NaN", "nan", "null", "NULL"];

/// One cell value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value
    #[default]
    Null,
    /// Numeric value
    Number(f64),
    /// Text value (already trimmed)
    Text(String),
}

impl CellValue {
    /// Builds a cell from raw text, trimming it and mapping empty sentinels to null
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NULL_SENTINELS.contains(&trimmed) {
            CellValue::Null
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    /// Returns true for a null cell
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric interpretation, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if v.is_finite() => Some(*v),
            CellValue::Number(_) | CellValue::Null => None,
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Coerces to a number, defaulting to zero
    pub fn to_number_or_zero(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }

    /// Display text; null renders as an empty string
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(v) => format_plain_number(*v),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// Formats a number without a trailing `.0` for integral values
pub fn format_plain_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// One claim row keyed by column name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimRow {
    fields: BTreeMap<String, CellValue>,
}

impl ClaimRow {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from (column, value) pairs
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CellValue)>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Generic accessor by column name
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// Sets a column value, replacing any previous value
    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.fields.insert(column.into(), value);
    }

    /// Returns true if the row carries the column (even if null)
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Sorted view of all fields
    pub fn fields(&self) -> &BTreeMap<String, CellValue> {
        &self.fields
    }

    /// Returns true if every field is null
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(CellValue::is_null)
    }

    /// Display text for a column; missing or null renders as ""
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(CellValue::display).unwrap_or_default()
    }

    /// Numeric value for a column; missing or non-numeric becomes 0
    pub fn number(&self, column: &str) -> f64 {
        self.get(column)
            .map(CellValue::to_number_or_zero)
            .unwrap_or(0.0)
    }

    /// Claim identifier (SEP), if present and non-empty
    pub fn claim_id(&self) -> Option<ClaimId> {
        ClaimId::new(self.text(columns::SEP)).ok()
    }

    /// INACBG case-mix code, if present and non-empty
    pub fn case_mix(&self) -> Option<CaseMixCode> {
        let code = self.text(columns::INACBG);
        if code.trim().is_empty() {
            None
        } else {
            Some(CaseMixCode::new(code))
        }
    }

    /// Length of stay in days
    pub fn los(&self) -> f64 {
        self.number(columns::LOS)
    }

    /// Total claimed tariff
    pub fn total_tariff(&self) -> f64 {
        self.number(columns::TOTAL_TARIF)
    }

    /// Hospital-internal tariff
    pub fn hospital_tariff(&self) -> f64 {
        self.number(columns::TARIF_RS)
    }

    /// Copy of the row restricted to the given columns
    pub fn project(&self, columns: &[String]) -> ClaimRow {
        ClaimRow {
            fields: columns
                .iter()
                .filter_map(|c| self.fields.get(c).map(|v| (c.clone(), v.clone())))
                .collect(),
        }
    }

    /// Removes a column from the row
    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        self.fields.remove(column)
    }
}

/// Ordered collection of rows loaded together
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Column names in header order
    pub columns: Vec<String>,

    /// Rows in file order
    pub rows: Vec<ClaimRow>,
}

impl Dataset {
    /// Creates an empty dataset with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a dataset from a header and rows
    pub fn with_rows(columns: Vec<String>, rows: Vec<ClaimRow>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if the header contains the column
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Adds a column to the header if absent, filling existing rows with `fill`
    pub fn ensure_column(&mut self, column: &str, fill: CellValue) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
        for row in &mut self.rows {
            if !row.contains(column) {
                row.set(column, fill.clone());
            }
        }
    }

    /// Coerces every present numeric column to a number (non-numeric becomes 0)
    pub fn normalize_numeric(&mut self) {
        let numeric: Vec<String> = self
            .columns
            .iter()
            .filter(|c| columns::is_numeric_column(c))
            .cloned()
            .collect();

        for row in &mut self.rows {
            for column in &numeric {
                let value = row.number(column);
                row.set(column.as_str(), CellValue::Number(value));
            }
        }
    }

    /// Subset of `wanted` present in the header, in `wanted` order
    pub fn present_columns(&self, wanted: &[&str]) -> Vec<String> {
        wanted
            .iter()
            .filter(|w| self.has_column(w))
            .map(|w| w.to_string())
            .collect()
    }

    /// Subset of `wanted` absent from the header, in `wanted` order
    pub fn missing_columns(&self, wanted: &[&str]) -> Vec<String> {
        wanted
            .iter()
            .filter(|w| !self.has_column(w))
            .map(|w| w.to_string())
            .collect()
    }
}
