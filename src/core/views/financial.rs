//! Financial reconciliation view
//!
//! Claimed tariff against the hospital tariff per episode, with the gap in
//! rupiah, as a percentage of the hospital tariff, and the claim per day.

use super::format::{ratio_or_zero, round_to};
use super::{AnalyticalView, Cell, ViewKind, ViewTable};
use crate::domain::columns::*;
use crate::domain::ClaimRow;

const REQUIRED: &[&str] = &[
    KODE_RS,
    KELAS_RS,
    KELAS_RAWAT,
    KODE_TARIF,
    ADMISSION_DATE,
    DISCHARGE_DATE,
    LOS,
    NAMA_PASIEN,
    NOKARTU,
    TOTAL_TARIF,
    TARIF_RS,
];

const OUTPUT: &[&str] = &[
    KODE_RS,
    KELAS_RS,
    KELAS_RAWAT,
    KODE_TARIF,
    ADMISSION_DATE,
    DISCHARGE_DATE,
    LOS,
    NAMA_PASIEN,
    NOKARTU,
    TOTAL_TARIF,
    TARIF_RS,
    "SELISIH_TARIF",
    "PERSENTASE_SELISIH",
    "TARIF_PER_HARI",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FinancialView;

impl AnalyticalView for FinancialView {
    fn kind(&self) -> ViewKind {
        ViewKind::Financial
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
            let total = row.total_tariff();
            let hospital = row.hospital_tariff();
            let los = row.los();
            let gap = total - hospital;

            table.push(vec![
                Cell::from_value(row.get(KODE_RS)),
                Cell::from_value(row.get(KELAS_RS)),
                Cell::from_value(row.get(KELAS_RAWAT)),
                Cell::from_value(row.get(KODE_TARIF)),
                Cell::date(row.text(ADMISSION_DATE)),
                Cell::date(row.text(DISCHARGE_DATE)),
                Cell::number(los),
                Cell::from_value(row.get(NAMA_PASIEN)),
                Cell::from_value(row.get(NOKARTU)),
                Cell::currency(total),
                Cell::currency(hospital),
                Cell::currency(gap),
                Cell::number(round_to(ratio_or_zero(gap, hospital) * 100.0, 2)),
                Cell::currency(round_to(ratio_or_zero(total, los), 2)),
            ]);
        }

        table
    }
}
