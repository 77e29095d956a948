//! Dataset integrity validation
//!
//! Fatal rules block persistence for the whole upload; warnings are recorded
//! and carried into the ingest summary.

use crate::domain::{columns, CellValue, ClaimReconError, ClaimRow, Dataset, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};

const EMPTY_ID_PENALTY: i32 = 20;
const DUPLICATE_ID_PENALTY: i32 = 10;
const NAME_MISMATCH_PENALTY: i32 = 15;

/// Outcome of validating one dataset
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// False when any fatal rule failed
    pub valid: bool,

    /// Fatal rule violations
    pub errors: Vec<String>,

    /// Non-fatal data-quality findings
    pub warnings: Vec<String>,

    /// SHA-256 of each row's sorted field map, in row order
    pub row_hashes: Vec<String>,

    /// 0..=100, informational only
    pub integrity_score: u8,

    /// Identifiers appearing more than once in the file
    pub duplicate_in_file: Vec<String>,
}

impl ValidationReport {
    /// Converts a failed report into a `Validation` error naming every violated rule
    pub fn into_result(self) -> Result<Self> {
        if self.valid {
            Ok(self)
        } else {
            Err(ClaimReconError::Validation(self.errors.join("; ")))
        }
    }
}

/// Enforces dataset-level invariants
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityValidator;

impl IntegrityValidator {
    /// Creates a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validates a dataset
    pub fn validate(&self, dataset: &Dataset) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut score: i32 = 100;

        if dataset.is_empty() {
            errors.push("Dataset contains no rows".to_string());
        }

        let has_sep = dataset.has_column(columns::SEP);
        if !has_sep {
            errors.push(format!("Required column '{}' is missing", columns::SEP));
        }

        let mut duplicate_in_file = Vec::new();
        if has_sep && !dataset.is_empty() {
            let empty_count = dataset
                .rows
                .iter()
                .filter(|r| r.claim_id().is_none())
                .count();
            if empty_count > 0 {
                errors.push(format!(
                    "{empty_count} row(s) have an empty {} value",
                    columns::SEP
                ));
                score -= EMPTY_ID_PENALTY;
            }

            duplicate_in_file = in_file_duplicates(&dataset.rows);
            if !duplicate_in_file.is_empty() {
                warnings.push(format!(
                    "{} {} value(s) appear more than once in the file: {}",
                    duplicate_in_file.len(),
                    columns::SEP,
                    preview(&duplicate_in_file)
                ));
                score -= DUPLICATE_ID_PENALTY;
            }
        }

        if dataset.has_column(columns::MRN) && dataset.has_column(columns::NAMA_PASIEN) {
            let inconsistent = inconsistent_names(&dataset.rows);
            if !inconsistent.is_empty() {
                warnings.push(format!(
                    "{} {} value(s) map to more than one {}: {}",
                    inconsistent.len(),
                    columns::MRN,
                    columns::NAMA_PASIEN,
                    preview(&inconsistent)
                ));
                score -= NAME_MISMATCH_PENALTY;
            }
        }

        let row_hashes = dataset.rows.iter().map(row_hash).collect();
        let valid = errors.is_empty();

        tracing::debug!(
            valid,
            errors = errors.len(),
            warnings = warnings.len(),
            integrity_score = score.max(0),
            "Dataset validated"
        );

        ValidationReport {
            valid,
            errors,
            warnings,
            row_hashes,
            integrity_score: score.clamp(0, 100) as u8,
            duplicate_in_file,
        }
    }
}

fn in_file_duplicates(rows: &[ClaimRow]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    for id in rows.iter().filter_map(ClaimRow::claim_id) {
        let entry = counts.entry(id.as_str().to_string()).or_insert(0);
        *entry += 1;
        if *entry == 2 {
            order.push(id.into_inner());
        }
    }
    order
}

fn inconsistent_names(rows: &[ClaimRow]) -> Vec<String> {
    let mut names: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        let mrn = row.text(columns::MRN);
        let name = row.text(columns::NAMA_PASIEN);
        if mrn.is_empty() || name.is_empty() {
            continue;
        }
        names.entry(mrn).or_default().insert(name);
    }
    names
        .into_iter()
        .filter(|(_, set)| set.len() > 1)
        .map(|(mrn, _)| mrn)
        .collect()
}

fn preview(values: &[String]) -> String {
    const SHOWN: usize = 5;
    let mut text = values
        .iter()
        .take(SHOWN)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if values.len() > SHOWN {
        text.push_str(&format!(" (+{} more)", values.len() - SHOWN));
    }
    text
}

/// Hex SHA-256 over a row's fields in key order
///
/// Each field feeds its name, a type tag and its value, length-prefixed so
/// that no two distinct rows share an input stream.
pub fn row_hash(row: &ClaimRow) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in row.fields() {
        feed(&mut hasher, name.as_bytes());
        match value {
            CellValue::Null => hasher.update([0u8]),
            CellValue::Number(v) => {
                hasher.update([1u8]);
                hasher.update(v.to_bits().to_be_bytes());
            }
            CellValue::Text(t) => {
                hasher.update([2u8]);
                feed(&mut hasher, t.as_bytes());
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

fn feed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
