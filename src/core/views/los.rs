//! Length-of-stay view

use super::format::{discharge_label, split_diagnosis};
use super::{AnalyticalView, Cell, ViewKind, ViewTable};
use crate::domain::columns::*;
use crate::domain::ClaimRow;

const REQUIRED: &[&str] = &[
    SEP,
    MRN,
    DIAGLIST,
    PROCLIST,
    INACBG,
    LOS,
    DISCHARGE_STATUS,
    TOTAL_TARIF,
    TARIF_RS,
    ADMISSION_DATE,
    DISCHARGE_DATE,
];

const OUTPUT: &[&str] = &[
    SEP,
    MRN,
    "PDX",
    "SDX",
    PROCLIST,
    INACBG,
    LOS,
    "CARA_PULANG",
    "TOTAL_CLAIM",
    "TOTAL_BILING_RS",
    "SELISIH",
    ADMISSION_DATE,
    DISCHARGE_DATE,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LosView;

impl AnalyticalView for LosView {
    fn kind(&self) -> ViewKind {
        ViewKind::Los
    }

    fn required_columns(&self) -> &'static [&'static str] {
        REQUIRED
    }

    fn output_columns(&self) -> &'static [&'static str] {
        OUTPUT
    }

    fn build(&self, rows: &[ClaimRow]) -> ViewTable {
        let mut table = ViewTable::new(OUTPUT);
        for row in rows {
            let (pdx, sdx) = split_diagnosis(&row.text(DIAGLIST));
            let total = row.total_tariff();
            let hospital = row.hospital_tariff();
            table.push(vec![
                Cell::from_value(row.get(SEP)),
                Cell::from_value(row.get(MRN)),
                Cell::text(pdx),
                Cell::text(sdx),
                Cell::from_value(row.get(PROCLIST)),
                Cell::from_value(row.get(INACBG)),
                Cell::number(row.los()),
                Cell::text(discharge_label(&row.text(DISCHARGE_STATUS))),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;
    use test_case::test_case;

    fn row(status: &str) -> ClaimRow {
        ClaimRow::from_pairs([
            (SEP, CellValue::from_raw("S1")),
            (DIAGLIST, CellValue::from_raw("A09 ; E86;R50.9")),
            (DISCHARGE_STATUS, CellValue::from_raw(status)),
            (LOS, CellValue::Number(4.0)),
            (TOTAL_TARIF, CellValue::Number(2_000_000.0)),
            (TARIF_RS, CellValue::Number(2_500_000.0)),
        ])
    }

    #[test_case("1", "physician-approved")]
    #[test_case("2", "referred out")]
    #[test_case("3", "self-discharged")]
    #[test_case("4", "deceased")]
    #[test_case("5", "5")]
    fn test_discharge_labels(code: &str, label: &str) {
        let table = LosView.build(&[row(code)]);
        assert_eq!(table.cell(0, "CARA_PULANG").unwrap().display, label);
    }

    #[test]
    fn test_diagnosis_split_and_gap() {
        let table = LosView.build(&[row("1")]);
        assert_eq!(table.cell(0, "PDX").unwrap().display, "A09");
        assert_eq!(table.cell(0, "SDX").unwrap().display, "E86;R50.9");
        assert_eq!(table.cell(0, "SELISIH").unwrap().numeric, Some(-500_000.0));
        assert_eq!(table.cell(0, "TOTAL_BILING_RS").unwrap().display, "Rp. 2.500.000");
        assert_eq!(table.cell(0, LOS).unwrap().display, "4");
    }
}
