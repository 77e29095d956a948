//! Case-mix driven tariff adjustment
//!
//! Apply exactly once per upload, after extraction and before persistence.
//! Running it again on adjusted data multiplies a second time.

use crate::domain::columns::TARIFF_TARGET_COLUMNS;
use crate::domain::{CellValue, Dataset, SeverityMarker};
use serde::Serialize;

/// Multiplier for codes whose severity marker is `0`
pub const ZERO_MULTIPLIER: f64 = 0.79;

/// Multiplier for codes whose severity marker is `I`, `II` or `III`
pub const ROMAN_MULTIPLIER: f64 = 0.73;

/// Rows per multiplier regime, for observability only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdjustmentSummary {
    pub zero_count: usize,
    pub roman_count: usize,
    pub other_count: usize,
}

impl AdjustmentSummary {
    /// Rows whose tariffs were rewritten
    pub fn adjusted_rows(&self) -> usize {
        self.zero_count + self.roman_count
    }
}

/// Multiplier for a severity regime
pub fn multiplier(severity: SeverityMarker) -> f64 {
    match severity {
        SeverityMarker::Zero => ZERO_MULTIPLIER,
        SeverityMarker::Roman => ROMAN_MULTIPLIER,
        SeverityMarker::Other => 1.0,
    }
}

/// Rounds half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rewrites the tariff target columns of every row in place
#[derive(Debug, Clone, Copy, Default)]
pub struct TariffAdjustmentEngine;

impl TariffAdjustmentEngine {
    pub fn new() -> Self {
        Self
    }

    /// Applies the multiplier rule and returns per-regime counts
    pub fn apply(&self, dataset: &mut Dataset) -> AdjustmentSummary {
        for column in TARIFF_TARGET_COLUMNS {
            dataset.ensure_column(column, CellValue::Number(0.0));
        }

        let mut summary = AdjustmentSummary::default();

        for row in &mut dataset.rows {
            let severity = row
                .case_mix()
                .map(|code| code.severity())
                .unwrap_or(SeverityMarker::Other);

            match severity {
                SeverityMarker::Zero => summary.zero_count += 1,
                SeverityMarker::Roman => summary.roman_count += 1,
                SeverityMarker::Other => {
                    summary.other_count += 1;
                    continue;
                }
            }

            let factor = multiplier(severity);
            for column in TARIFF_TARGET_COLUMNS {
                let adjusted = round2(row.number(column) * factor);
                row.set(*column, CellValue::Number(adjusted));
            }
        }

        tracing::info!(
            zero = summary.zero_count,
            roman = summary.roman_count,
            unchanged = summary.other_count,
            "Tariff adjustment applied"
        );

        summary
    }
}
