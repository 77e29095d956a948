//! Case-mix aggregation view
//!
//! One output row per INACBG code, ordered by code. Rows without a code are
//! not attributed to any group.

use super::format::{ratio_or_zero, round_to};
use super::{AnalyticalView, Cell, ViewKind, ViewTable};
use crate::domain::columns::*;
use crate::domain::ClaimRow;
use std::collections::BTreeMap;

const REQUIRED: &[&str] = &[INACBG, LOS, TOTAL_TARIF, TARIF_RS, ADMISSION_DATE];

const OPTIONAL: &[&str] = &[PENUNJANG, OBAT, BMHP, ALKES, SEWA_ALAT];

const OUTPUT: &[&str] = &[
    INACBG,
    "JML_PASIEN",
    "MIN_LOS",
    "AV_LOS",
    "MAX_LOS",
    "TOTAL_CLAIM",
    "TOTAL_BILLING_RS",
    "SELISIH",
    "ARPP",
    "TOTAL_PENUNJANG",
    "TOTAL_OBAT",
    "TOTAL_BMHP_ALKES",
    "TOTAL_SEWA_ALAT",
];

#[derive(Debug, Default)]
struct Group {
    count: usize,
    min_los: f64,
    max_los: f64,
    los_sum: f64,
    claim: f64,
    billing: f64,
    penunjang: f64,
    obat: f64,
    bmhp_alkes: f64,
    sewa_alat: f64,
}

impl Group {
    fn add(&mut self, row: &ClaimRow) {
        let los = row.los();
        if self.count == 0 {
            self.min_los = los;
            self.max_los = los;
        } else {
            self.min_los = self.min_los.min(los);
            self.max_los = self.max_los.max(los);
        }
        self.count += 1;
        self.los_sum += los;
        self.claim += row.total_tariff();
        self.billing += row.hospital_tariff();
        // Missing cost columns read as 0
        self.penunjang += row.number(PENUNJANG);
        self.obat += row.number(OBAT);
        self.bmhp_alkes += row.number(BMHP) + row.number(ALKES);
        self.sewa_alat += row.number(SEWA_ALAT);
    }

    fn cells(&self, code: &str) -> Vec<Cell> {
        let count = self.count as f64;
        vec![
            Cell::text(code),
            Cell::number(count),
            Cell::number(round_to(self.min_los, 2)),
            Cell::number(round_to(ratio_or_zero(self.los_sum, count), 2)),
            Cell::number(round_to(self.max_los, 2)),
            Cell::currency(round_to(self.claim, 2)),
            Cell::currency(round_to(self.billing, 2)),
            Cell::currency(round_to(self.claim - self.billing, 2)),
            Cell::currency(round_to(ratio_or_zero(self.claim, count), 0)),
            Cell::currency(round_to(self.penunjang, 2)),
            Cell::currency(round_to(self.obat, 2)),
            Cell::currency(round_to(self.bmhp_alkes, 2)),
            Cell::currency(round_to(self.sewa_alat, 2)),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InacbgView;

impl AnalyticalView for InacbgView {
    fn kind(&self) -> ViewKind {
        ViewKind::Inacbg
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
        let mut groups: BTreeMap<String, Group> = BTreeMap::new();
        for row in rows {
            if let Some(code) = row.case_mix() {
                groups
                    .entry(code.as_str().trim().to_string())
                    .or_default()
                    .add(row);
            }
        }

        let mut table = ViewTable::new(OUTPUT);
        for (code, group) in &groups {
            table.push(group.cells(code));
        }
        table
    }
}
