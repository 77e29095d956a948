//! Tabular extraction into a [`Dataset`]
//!
//! Delimited text is decoded with the detected encoding and parsed with the
//! `csv` crate. Spreadsheets go through `calamine`, trying each reader engine
//! until one opens the first worksheet. Both paths share the same cleaning:
//! trimmed text, empty sentinels as null, fully-empty rows and columns dropped,
//! and headers kept verbatim except for blank or repeated names.

use crate::core::ingest::detect::{Detection, FileFormat, SpreadsheetKind};
use crate::domain::row::format_plain_number;
use crate::domain::{CellValue, ClaimRow, Dataset, FormatError, ReaderAttempt};
use calamine::{open_workbook, Data, Ods, Range, Reader, Xls, Xlsb, Xlsx};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Engine order after the one matching the extension
const ENGINE_ORDER: [SpreadsheetKind; 4] = [
    SpreadsheetKind::Xlsx,
    SpreadsheetKind::Xls,
    SpreadsheetKind::Xlsb,
    SpreadsheetKind::Ods,
];

/// Extraction result
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    /// Cleaned rows
    pub dataset: Dataset,

    /// Reader that produced the rows
    pub reader: String,

    /// Readers that failed before `reader` succeeded
    pub failed_attempts: Vec<ReaderAttempt>,

    /// Rows dropped because every cell was empty
    pub dropped_rows: usize,

    /// Columns dropped because every cell was empty
    pub dropped_columns: usize,
}

/// Raw header + cells before cleaning
#[derive(Debug, Default)]
struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// Turns files into datasets according to a [`Detection`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularExtractor;

impl TabularExtractor {
    /// Creates a new extractor
    pub fn new() -> Self {
        Self
    }

    /// Reads and cleans a file
    ///
    /// # Errors
    ///
    /// `FormatError::Unreadable` when the file cannot be read,
    /// `FormatError::Extraction` when no reader succeeds and
    /// `FormatError::NoRows` when cleaning leaves no data rows.
    pub fn extract(&self, path: &Path, detection: &Detection) -> Result<ExtractedTable, FormatError> {
        match detection.format {
            FileFormat::Delimited => {
                let bytes = std::fs::read(path).map_err(|e| FormatError::Unreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                self.extract_delimited(&bytes, detection)
            }
            FileFormat::Spreadsheet(kind) => self.extract_spreadsheet(path, kind),
        }
    }

    /// Parses delimited text already loaded in memory
    pub fn extract_delimited(
        &self,
        bytes: &[u8],
        detection: &Detection,
    ) -> Result<ExtractedTable, FormatError> {
        let (text, _) = detection.encoding.decode_with_bom_removal(bytes);

        let grid = parse_delimited(&text, detection.delimiter).map_err(|reason| {
            FormatError::Extraction {
                attempts: vec![ReaderAttempt::new("csv", reason)],
            }
        })?;

        finish(grid, "csv".to_string(), Vec::new())
    }

    fn extract_spreadsheet(
        &self,
        path: &Path,
        preferred: SpreadsheetKind,
    ) -> Result<ExtractedTable, FormatError> {
        let order = std::iter::once(preferred)
            .chain(ENGINE_ORDER.iter().copied().filter(|k| *k != preferred));

        let mut attempts = Vec::new();
        for kind in order {
            let outcome = match kind {
                SpreadsheetKind::Xlsx => first_sheet::<Xlsx<BufReader<File>>>(path),
                SpreadsheetKind::Xls => first_sheet::<Xls<BufReader<File>>>(path),
                SpreadsheetKind::Xlsb => first_sheet::<Xlsb<BufReader<File>>>(path),
                SpreadsheetKind::Ods => first_sheet::<Ods<BufReader<File>>>(path),
            };

            match outcome {
                Ok(range) => {
                    tracing::debug!(engine = kind.method(), "Spreadsheet reader succeeded");
                    return finish(grid_from_range(&range), kind.method().to_string(), attempts);
                }
                Err(reason) => {
                    tracing::debug!(engine = kind.method(), reason = %reason, "Spreadsheet reader failed");
                    attempts.push(ReaderAttempt::new(kind.method(), reason));
                }
            }
        }

        Err(FormatError::Extraction { attempts })
    }
}

fn first_sheet<R>(path: &Path) -> Result<Range<Data>, String>
where
    R: Reader<BufReader<File>>,
    R::Error: std::fmt::Display,
{
    let mut workbook: R = open_workbook(path).map_err(|e: R::Error| e.to_string())?;
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(e.to_string()),
        None => Err("workbook has no worksheets".to_string()),
    }
}

fn parse_delimited(text: &str, delimiter: u8) -> Result<Grid, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Grid::default();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        if idx == 0 {
            grid.header = record.iter().map(str::to_string).collect();
        } else {
            grid.rows
                .push(record.iter().map(CellValue::from_raw).collect());
        }
    }
    Ok(grid)
}

fn grid_from_range(range: &Range<Data>) -> Grid {
    let mut grid = Grid::default();
    for (idx, row) in range.rows().enumerate() {
        if idx == 0 {
            grid.header = row.iter().map(header_from_data).collect();
        } else {
            grid.rows.push(row.iter().map(cell_from_data).collect());
        }
    }
    grid
}

fn header_from_data(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        other => cell_from_data(other).display(),
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) if v.is_finite() => CellValue::Number(*v),
        Data::Float(_) => CellValue::Null,
        Data::String(s) => CellValue::from_raw(s),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                CellValue::Text(ndt.format("%d/%m/%Y").to_string())
            }
            Some(ndt) => CellValue::Text(ndt.format("%d/%m/%Y %H:%M:%S").to_string()),
            None => CellValue::Text(format_plain_number(dt.as_f64())),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_raw(s),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// Names blank headers `Unnamed: <idx>` and suffixes repeats with `.1`, `.2`…
fn unique_headers(raw: &[String], width: usize) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(width);

    for idx in 0..width {
        let base = match raw.get(idx) {
            Some(h) if !h.trim().is_empty() => h.clone(),
            _ => format!("Unnamed: {idx}"),
        };

        let mut name = base.clone();
        if let Some(&start) = seen.get(&base) {
            let mut count = start;
            loop {
                name = format!("{base}.{count}");
                count += 1;
                if !seen.contains_key(&name) {
                    break;
                }
            }
            seen.insert(base.clone(), count);
        }
        seen.entry(name.clone()).or_insert(1);
        out.push(name);
    }
    out
}

fn finish(
    grid: Grid,
    reader: String,
    failed_attempts: Vec<ReaderAttempt>,
) -> Result<ExtractedTable, FormatError> {
    let width = grid
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(grid.header.len()))
        .max()
        .unwrap_or(0);
    let header = unique_headers(&grid.header, width);

    let total_rows = grid.rows.len();
    let rows: Vec<Vec<CellValue>> = grid
        .rows
        .into_iter()
        .filter(|r| r.iter().any(|c| !c.is_null()))
        .collect();
    let dropped_rows = total_rows - rows.len();

    let keep: Vec<usize> = (0..width)
        .filter(|&col| {
            rows.iter()
                .any(|r| r.get(col).map(|c| !c.is_null()).unwrap_or(false))
        })
        .collect();
    let dropped_columns = width - keep.len();

    if rows.is_empty() {
        return Err(FormatError::NoRows);
    }

    let columns: Vec<String> = keep.iter().map(|&i| header[i].clone()).collect();
    let claim_rows = rows
        .into_iter()
        .map(|cells| {
            ClaimRow::from_pairs(keep.iter().map(|&i| {
                (
                    header[i].clone(),
                    cells.get(i).cloned().unwrap_or(CellValue::Null),
                )
            }))
        })
        .collect();

    tracing::debug!(
        reader = %reader,
        rows = total_rows - dropped_rows,
        columns = columns.len(),
        dropped_rows,
        dropped_columns,
        "Extracted tabular data"
    );

    Ok(ExtractedTable {
        dataset: Dataset::with_rows(columns, claim_rows),
        reader,
        failed_attempts,
        dropped_rows,
        dropped_columns,
    })
}
