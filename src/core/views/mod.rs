//! Analytical views over persisted claims
//!
//! Each view is a pure function from persisted rows to a [`ViewTable`]. The
//! query engine decides which rows reach a view and filters and sorts its
//! output; views never see query parameters.

pub mod financial;
pub mod format;
pub mod inacbg;
pub mod los;
pub mod patient;
pub mod selisih_tarif;
pub mod table;
pub mod ventilator;

pub use financial::FinancialView;
pub use inacbg::InacbgView;
pub use los::LosView;
pub use patient::PatientView;
pub use selisih_tarif::SelisihTarifView;
pub use table::{Cell, ViewTable};
pub use ventilator::VentilatorView;

use crate::domain::ClaimRow;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Derives an output table from persisted rows
pub trait AnalyticalView: Send + Sync {
    /// Which view this is
    fn kind(&self) -> ViewKind;

    /// Columns the persisted schema must contain
    fn required_columns(&self) -> &'static [&'static str];

    /// Columns used when present
    fn optional_columns(&self) -> &'static [&'static str] {
        &[]
    }

    /// Output header, in order
    fn output_columns(&self) -> &'static [&'static str];

    /// Builds the table
    fn build(&self, rows: &[ClaimRow]) -> ViewTable;

    /// Columns to fetch from the store
    fn source_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .required_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
        for column in self.optional_columns() {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
        columns
    }
}

/// The six views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Financial,
    Patient,
    Los,
    Inacbg,
    SelisihTarif,
    Ventilator,
}

static FINANCIAL: FinancialView = FinancialView;
static PATIENT: PatientView = PatientView;
static LOS: LosView = LosView;
static INACBG: InacbgView = InacbgView;
static SELISIH_TARIF: SelisihTarifView = SelisihTarifView;
static VENTILATOR: VentilatorView = VentilatorView;

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::Financial,
        ViewKind::Patient,
        ViewKind::Los,
        ViewKind::Inacbg,
        ViewKind::SelisihTarif,
        ViewKind::Ventilator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Financial => "financial",
            ViewKind::Patient => "patient",
            ViewKind::Los => "los",
            ViewKind::Inacbg => "inacbg",
            ViewKind::SelisihTarif => "selisih-tarif",
            ViewKind::Ventilator => "ventilator",
        }
    }

    /// The builder for this view
    pub fn view(&self) -> &'static dyn AnalyticalView {
        match self {
            ViewKind::Financial => &FINANCIAL,
            ViewKind::Patient => &PATIENT,
            ViewKind::Los => &LOS,
            ViewKind::Inacbg => &INACBG,
            ViewKind::SelisihTarif => &SELISIH_TARIF,
            ViewKind::Ventilator => &VENTILATOR,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "financial" => Ok(ViewKind::Financial),
            "patient" => Ok(ViewKind::Patient),
            "los" => Ok(ViewKind::Los),
            "inacbg" => Ok(ViewKind::Inacbg),
            "selisih-tarif" | "selisih" => Ok(ViewKind::SelisihTarif),
            "ventilator" => Ok(ViewKind::Ventilator),
            other => Err(format!(
                "Unknown view '{other}'. Expected one of: {}",
                ViewKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_kind_roundtrip() {
        for kind in ViewKind::ALL {
            assert_eq!(kind.as_str().parse::<ViewKind>().unwrap(), kind);
            assert_eq!(kind.view().kind(), kind);
        }
        assert_eq!("SELISIH_TARIF".parse::<ViewKind>().unwrap(), ViewKind::SelisihTarif);
        assert!("billing".parse::<ViewKind>().is_err());
    }

    #[test]
    fn test_source_columns_include_optional_once() {
        let columns = ViewKind::Ventilator.view().source_columns();
        assert!(columns.contains(&"C2".to_string()));
        assert_eq!(columns.iter().filter(|c| *c == "VENT_HOUR").count(), 1);
    }

    #[test]
    fn test_every_view_outputs_unique_columns() {
        for kind in ViewKind::ALL {
            let outputs = kind.view().output_columns();
            let mut seen = std::collections::HashSet::new();
            for column in outputs {
                assert!(seen.insert(column), "{kind}: duplicate {column}");
            }
        }
    }
}
