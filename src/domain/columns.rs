//! Column catalogue for INACBG claim extracts
//!
//! Names match the header row of the e-klaim export verbatim.

pub const SEP: &str = "SEP";
pub const MRN: &str = "MRN";
pub const NAMA_PASIEN: &str = "NAMA_PASIEN";
pub const NOKARTU: &str = "NOKARTU";
pub const KODE_RS: &str = "KODE_RS";
pub const KELAS_RS: &str = "KELAS_RS";
pub const KELAS_RAWAT: &str = "KELAS_RAWAT";
pub const KODE_TARIF: &str = "KODE_TARIF";
pub const ADMISSION_DATE: &str = "ADMISSION_DATE";
pub const DISCHARGE_DATE: &str = "DISCHARGE_DATE";
pub const BIRTH_DATE: &str = "BIRTH_DATE";
pub const BIRTH_WEIGHT: &str = "BIRTH_WEIGHT";
pub const SEX: &str = "SEX";
pub const LOS: &str = "LOS";
pub const DISCHARGE_STATUS: &str = "DISCHARGE_STATUS";
pub const DIAGLIST: &str = "DIAGLIST";
pub const PROCLIST: &str = "PROCLIST";
pub const INACBG: &str = "INACBG";
pub const DESKRIPSI_INACBG: &str = "DESKRIPSI_INACBG";
pub const UMUR_TAHUN: &str = "UMUR_TAHUN";
pub const UMUR_HARI: &str = "UMUR_HARI";
pub const TOTAL_TARIF: &str = "TOTAL_TARIF";
pub const TARIF_RS: &str = "TARIF_RS";
pub const C2: &str = "C2";
pub const VENT_HOUR: &str = "VENT_HOUR";

// Cost categories
pub const PROSEDUR_NON_BEDAH: &str = "PROSEDUR_NON_BEDAH";
pub const PROSEDUR_BEDAH: &str = "PROSEDUR_BEDAH";
pub const KONSULTASI: &str = "KONSULTASI";
pub const TENAGA_AHLI: &str = "TENAGA_AHLI";
pub const KEPERAWATAN: &str = "KEPERAWATAN";
pub const PENUNJANG: &str = "PENUNJANG";
pub const RADIOLOGI: &str = "RADIOLOGI";
pub const LABORATORIUM: &str = "LABORATORIUM";
pub const PELAYANAN_DARAH: &str = "PELAYANAN_DARAH";
pub const REHABILITASI: &str = "REHABILITASI";
pub const KAMAR_AKOMODASI: &str = "KAMAR_AKOMODASI";
pub const RAWAT_INTENSIF: &str = "RAWAT_INTENSIF";
pub const OBAT: &str = "OBAT";
pub const OBAT_KRONIS: &str = "OBAT_KRONIS";
pub const OBAT_KEMOTERAPI: &str = "OBAT_KEMOTERAPI";
pub const ALKES: &str = "ALKES";
pub const BMHP: &str = "BMHP";
pub const SEWA_ALAT: &str = "SEWA_ALAT";

/// Columns coerced to numbers at load time (non-numeric input becomes 0)
pub const NUMERIC_COLUMNS: &[&str] = &[
    LOS,
    UMUR_TAHUN,
    UMUR_HARI,
    TOTAL_TARIF,
    TARIF_RS,
    PROSEDUR_NON_BEDAH,
    PROSEDUR_BEDAH,
    KONSULTASI,
    TENAGA_AHLI,
    KEPERAWATAN,
    PENUNJANG,
    RADIOLOGI,
    LABORATORIUM,
    PELAYANAN_DARAH,
    REHABILITASI,
    KAMAR_AKOMODASI,
    RAWAT_INTENSIF,
    OBAT,
    OBAT_KRONIS,
    OBAT_KEMOTERAPI,
    ALKES,
    BMHP,
    SEWA_ALAT,
];

/// Columns rewritten by the tariff multiplier
pub const TARIFF_TARGET_COLUMNS: &[&str] = &[TARIF_RS, PENUNJANG, RADIOLOGI, LABORATORIUM];

/// Returns true when the column is normalised to a number at load time
pub fn is_numeric_column(name: &str) -> bool {
    NUMERIC_COLUMNS.contains(&name)
}
