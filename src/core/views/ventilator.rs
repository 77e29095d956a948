//! Ventilator utilization view
//!
//! Ventilation hours come from the `ventilator` object inside the `C2` JSON
//! document. When that yields nothing, a numeric `VENT_HOUR` source column is
//! used instead.

use super::format::{ratio_or_zero, round_to, split_diagnosis};
use super::{AnalyticalView, Cell, ViewKind, ViewTable};
use crate::domain::columns::*;
use crate::domain::ClaimRow;
use chrono::NaiveDateTime;
use serde_json::Value;

pub const USED_LABEL: &str = "Pakai Vent";
pub const NOT_USED_LABEL: &str = "Tidak Pakai Vent";

const UNKNOWN_TIMESTAMP: &str = "0000-00-00 00:00:00";
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const REQUIRED: &[&str] = &[
    SEP,
    MRN,
    LOS,
    DIAGLIST,
    PROCLIST,
    C2,
    TOTAL_TARIF,
    TARIF_RS,
    ADMISSION_DATE,
    DISCHARGE_DATE,
];

const OPTIONAL: &[&str] = &[VENT_HOUR];

const OUTPUT: &[&str] = &[
    SEP,
    "MR",
    LOS,
    "PDX",
    "SDX",
    PROCLIST,
    "VENT_USE",
    VENT_HOUR,
    "VENT_RATIO",
    "TOTAL_CLAIM",
    "TOTAL_BILLING_RS",
    "SELISIH",
    ADMISSION_DATE,
    DISCHARGE_DATE,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct VentilatorView;

impl AnalyticalView for VentilatorView {
    fn kind(&self) -> ViewKind {
        ViewKind::Ventilator
    }

    fn required_columns(&self) -> &'static [&'static str] {
        REQUIRED
    }

    fn optional_columns(&self) -> &'static [&'static str] {
        OPTIONAL
    }

    fn output_columns(&self) -> &'static [&'static str] {
        OUTPUT
    }

    fn build(&self, rows: &[ClaimRow]) -> ViewTable {
        let mut table = ViewTable::new(OUTPUT);
        for row in rows {
            let (pdx, sdx) = split_diagnosis(&row.text(DIAGLIST));
            let hours = ventilation_hours(row);
            let los = row.los();
            let total = row.total_tariff();
            let hospital = row.hospital_tariff();
            let label = if hours > 0.0 { USED_LABEL } else { NOT_USED_LABEL };

            table.push(vec![
                Cell::from_value(row.get(SEP)),
                Cell::from_value(row.get(MRN)),
                Cell::number(los),
                Cell::text(pdx),
                Cell::text(sdx),
                Cell::from_value(row.get(PROCLIST)),
                Cell::text(label),
                Cell::number(round_to(hours, 2)),
                Cell::number(round_to(ratio_or_zero(hours, los * 24.0), 4)),
                Cell::currency(total),
                Cell::currency(hospital),
                Cell::currency(total - hospital),
                Cell::date(row.text(ADMISSION_DATE)),
                Cell::date(row.text(DISCHARGE_DATE)),
            ]);
        }
        table
    }
}

/// Hours of ventilation for one episode, never negative
pub fn ventilation_hours(row: &ClaimRow) -> f64 {
    let from_document = hours_from_c2(&row.text(C2)).unwrap_or(0.0);
    if from_document > 0.0 {
        return from_document;
    }
    row.get(VENT_HOUR)
        .and_then(|v| v.as_f64())
        .filter(|h| *h > 0.0)
        .unwrap_or(0.0)
}

/// Hours between `start_dttm` and `stop_dttm` when `use_ind` is set
///
/// Returns `None` for unparsable documents, a missing `ventilator` object, a
/// cleared `use_ind`, or unknown timestamps.
pub fn hours_from_c2(document: &str) -> Option<f64> {
    let trimmed = document.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed: Value = serde_json::from_str(trimmed).ok()?;
    let ventilator = find_ventilator(&parsed)?;

    if !flag_set(ventilator.get("use_ind")?) {
        return None;
    }

    let start = timestamp(ventilator.get("start_dttm")?)?;
    let stop = timestamp(ventilator.get("stop_dttm")?)?;
    let seconds = (stop - start).num_seconds() as f64;
    Some((seconds / 3600.0).max(0.0))
}

fn find_ventilator(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get("ventilator").filter(|v| v.is_object()) {
                return Some(found);
            }
            map.values().find_map(find_ventilator)
        }
        Value::Array(items) => items.iter().find_map(find_ventilator),
        _ => None,
    }
}

fn flag_set(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim() == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        Value::Bool(b) => *b,
        _ => false,
    }
}

fn timestamp(value: &Value) -> Option<NaiveDateTime> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() || raw == UNKNOWN_TIMESTAMP {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
