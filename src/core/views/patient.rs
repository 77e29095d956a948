//! Patient roster view
//!
//! Always the same 38 columns; anything the store lacks is an empty cell.

use super::{AnalyticalView, Cell, ViewKind, ViewTable};
use crate::domain::columns::*;
use crate::domain::ClaimRow;

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
    BIRTH_DATE,
    BIRTH_WEIGHT,
    SEX,
    DISCHARGE_STATUS,
    DIAGLIST,
    PROCLIST,
    "ADL1",
    "ADL2",
    "IN_SP",
    "IN_SR",
    "IN_SI",
    "IN_SD",
    INACBG,
    "SUBACUTE",
    "CHRONIC",
    "SP",
    "SR",
    "SI",
    "SD",
    DESKRIPSI_INACBG,
    MRN,
    UMUR_TAHUN,
    UMUR_HARI,
    "DPJP",
    SEP,
    "PAYOR_ID",
    "CODER_ID",
    "VERSI_INACBG",
    "VERSI_GROUPER",
];

const DATE_COLUMNS: &[&str] = &[ADMISSION_DATE, DISCHARGE_DATE, BIRTH_DATE];

#[derive(Debug, Clone, Copy, Default)]
pub struct PatientView;

impl AnalyticalView for PatientView {
    fn kind(&self) -> ViewKind {
        ViewKind::Patient
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[]
    }

    fn optional_columns(&self) -> &'static [&'static str] {
        OUTPUT
    }

    fn output_columns(&self) -> &'static [&'static str] {
        OUTPUT
    }

    fn build(&self, rows: &[ClaimRow]) -> ViewTable {
        let mut table = ViewTable::new(OUTPUT);
        for row in rows {
            table.push(
                OUTPUT
                    .iter()
                    .map(|column| {
                        if DATE_COLUMNS.contains(column) && row.contains(column) {
                            Cell::date(row.text(column))
                        } else {
                            Cell::from_value(row.get(column))
                        }
                    })
                    .collect(),
            );
        }
        table
    }
}
