//! Per-episode tariff gap view

use super::format::split_diagnosis;
use super::{AnalyticalView, Cell, ViewKind, ViewTable};
use crate::domain::columns::*;
use crate::domain::ClaimRow;

const REQUIRED: &[&str] = &[
    SEP,
    MRN,
    LOS,
    DIAGLIST,
    PROCLIST,
    INACBG,
    DESKRIPSI_INACBG,
    TOTAL_TARIF,
    TARIF_RS,
    ADMISSION_DATE,
    DISCHARGE_DATE,
];

const OUTPUT: &[&str] = &[
    SEP,
    "RM",
    LOS,
    "PDX",
    "SDX",
    PROCLIST,
    INACBG,
    DESKRIPSI_INACBG,
    "TOTAL_CLAIM",
    "TOTAL_BILING_RS",
    "SELISIH",
    ADMISSION_DATE,
    DISCHARGE_DATE,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SelisihTarifView;

impl AnalyticalView for SelisihTarifView {
    fn kind(&self) -> ViewKind {
        ViewKind::SelisihTarif
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
                Cell::number(row.los()),
                Cell::text(pdx),
                Cell::text(sdx),
                Cell::from_value(row.get(PROCLIST)),
                Cell::from_value(row.get(INACBG)),
                Cell::from_value(row.get(DESKRIPSI_INACBG)),
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
