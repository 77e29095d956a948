//! File format, encoding and delimiter detection
//!
//! Detection is pure inspection: it reads a bounded prefix of the file and never
//! fails on an undecodable sample. Unknown extensions are the only format error
//! besides an unreadable file.

use crate::config::IngestConfig;
use crate::domain::FormatError;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Delimiters considered, in tie-break order
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Share of printable characters a fallback decode must reach to be accepted
const PRINTABLE_THRESHOLD: f32 = 0.95;

/// Confidence reported when the byte-frequency detector is sure of its guess
const CONFIDENT_GUESS: f32 = 0.9;

/// Upper bound on the confidence of a fallback match
const FALLBACK_CEILING: f32 = 0.5;

/// Spreadsheet container flavour, used to pick the first reader engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetKind {
    Xlsx,
    Xls,
    Xlsb,
    Ods,
}

impl SpreadsheetKind {
    /// Reader method name as reported in extraction attempts
    pub fn method(&self) -> &'static str {
        match self {
            SpreadsheetKind::Xlsx => "xlsx",
            SpreadsheetKind::Xls => "xls",
            SpreadsheetKind::Xlsb => "xlsb",
            SpreadsheetKind::Ods => "ods",
        }
    }
}

/// Detected container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text (csv, tsv, txt)
    Delimited,
    /// Spreadsheet workbook
    Spreadsheet(SpreadsheetKind),
}

impl FileFormat {
    /// Maps a file extension (case-insensitive) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(FileFormat::Delimited),
            "xlsx" | "xlsm" => Some(FileFormat::Spreadsheet(SpreadsheetKind::Xlsx)),
            "xls" => Some(FileFormat::Spreadsheet(SpreadsheetKind::Xls)),
            "xlsb" => Some(FileFormat::Spreadsheet(SpreadsheetKind::Xlsb)),
            "ods" => Some(FileFormat::Spreadsheet(SpreadsheetKind::Ods)),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Delimited => write!(f, "tabular"),
            FileFormat::Spreadsheet(kind) => write!(f, "spreadsheet ({})", kind.method()),
        }
    }
}

/// Result of inspecting one file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Container format
    pub format: FileFormat,

    /// Text encoding (UTF-8 for spreadsheets)
    pub encoding: &'static Encoding,

    /// Confidence in the chosen encoding, 0.0..=1.0
    pub encoding_confidence: f32,

    /// Field delimiter (comma for spreadsheets)
    pub delimiter: u8,
}

impl Detection {
    /// Human-readable delimiter name
    pub fn delimiter_name(&self) -> &'static str {
        match self.delimiter {
            b',' => "comma",
            b';' => "semicolon",
            b'\t' => "tab",
            b'|' => "pipe",
            _ => "other",
        }
    }
}

/// Inspects files to decide format, encoding and delimiter
#[derive(Debug, Clone)]
pub struct FormatDetector {
    sample_bytes: usize,
    sample_lines: usize,
    fallback_encodings: Vec<&'static Encoding>,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

impl FormatDetector {
    /// Builds a detector from ingest settings
    ///
    /// Unknown labels are skipped, as are aliases of an encoding already in
    /// the list (`iso-8859-1` resolves to windows-1252).
    pub fn from_config(config: &IngestConfig) -> Self {
        let mut fallback_encodings: Vec<&'static Encoding> = Vec::new();
        for encoding in config
            .fallback_encodings
            .iter()
            .filter_map(|label| Encoding::for_label(label.as_bytes()))
        {
            if !fallback_encodings.contains(&encoding) {
                fallback_encodings.push(encoding);
            }
        }

        Self {
            sample_bytes: config.encoding_sample_bytes,
            sample_lines: config.delimiter_sample_lines,
            fallback_encodings,
        }
    }

    /// Inspects a file
    ///
    /// # Errors
    ///
    /// `FormatError::Unsupported` for an unknown extension and
    /// `FormatError::Unreadable` when the sample cannot be read.
    pub fn detect(&self, path: &Path) -> Result<Detection, FormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| FormatError::Unsupported(ext.to_string()))?;

        if let FileFormat::Spreadsheet(_) = format {
            return Ok(Detection {
                format,
                encoding: UTF_8,
                encoding_confidence: 1.0,
                delimiter: b',',
            });
        }

        let sample = read_sample(path, self.sample_bytes)?;
        Ok(self.detect_bytes(&sample))
    }

    /// Detection over an in-memory sample of delimited text
    pub fn detect_bytes(&self, sample: &[u8]) -> Detection {
        let (encoding, encoding_confidence) = self.detect_encoding(sample);
        let (text, _) = encoding.decode_with_bom_removal(sample);
        let delimiter = detect_delimiter(&text, self.sample_lines);

        tracing::debug!(
            encoding = encoding.name(),
            confidence = encoding_confidence,
            delimiter = %(delimiter as char).escape_default(),
            "Detected delimited text parameters"
        );

        Detection {
            format: FileFormat::Delimited,
            encoding,
            encoding_confidence,
            delimiter,
        }
    }

    /// Decides the encoding of a byte sample
    ///
    /// Order: BOM, pure ASCII, valid UTF-8 (a multi-byte sequence cut by the
    /// sample boundary is tolerated), then chardetng's byte-frequency guess.
    /// When that guess is not confident, each fallback encoding that decodes
    /// without error into mostly printable text is tried in turn. Defaults to
    /// UTF-8.
    pub fn detect_encoding(&self, sample: &[u8]) -> (&'static Encoding, f32) {
        if let Some((encoding, _)) = Encoding::for_bom(sample) {
            return (encoding, 1.0);
        }

        if sample.is_ascii() {
            return (UTF_8, 1.0);
        }

        match std::str::from_utf8(sample) {
            Ok(_) => return (UTF_8, 0.99),
            Err(e) if e.error_len().is_none() => return (UTF_8, 0.95),
            Err(_) => {}
        }

        let mut detector = EncodingDetector::new();
        detector.feed(sample, true);
        let (guess, confident) = detector.guess_assess(None, false);
        if confident {
            tracing::debug!(encoding = guess.name(), "Byte-frequency guess accepted");
            return (guess, CONFIDENT_GUESS);
        }
        tracing::debug!(
            encoding = guess.name(),
            "Byte-frequency guess not confident; trying fallbacks"
        );

        for &encoding in &self.fallback_encodings {
            if encoding == UTF_8 {
                continue;
            }
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(sample)
            {
                let score = printable_ratio(&text);
                if score >= PRINTABLE_THRESHOLD {
                    return (encoding, score * FALLBACK_CEILING);
                }
            }
        }

        tracing::warn!("No encoding matched the sample; defaulting to UTF-8");
        (UTF_8, 0.0)
    }
}

fn read_sample(path: &Path, limit: usize) -> Result<Vec<u8>, FormatError> {
    let unreadable = |e: std::io::Error| FormatError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let file = File::open(path).map_err(unreadable)?;
    let mut sample = Vec::with_capacity(limit);
    file.take(limit as u64)
        .read_to_end(&mut sample)
        .map_err(unreadable)?;
    Ok(sample)
}

fn printable_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut printable = 0usize;
    for c in text.chars() {
        total += 1;
        if !c.is_control() || matches!(c, '\t' | '\r' | '\n') {
            printable += 1;
        }
    }
    if total == 0 {
        1.0
    } else {
        printable as f32 / total as f32
    }
}

/// Picks the delimiter with the most unquoted occurrences over the first lines
///
/// Ties go to the earlier candidate; no occurrences at all means comma.
pub fn detect_delimiter(text: &str, max_lines: usize) -> u8 {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];

    for line in text.lines().take(max_lines) {
        let mut in_quotes = false;
        for byte in line.bytes() {
            if byte == b'"' {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }
            if let Some(idx) = DELIMITER_CANDIDATES.iter().position(|d| *d == byte) {
                counts[idx] += 1;
            }
        }
    }

    let mut best = 0usize;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }

    if counts[best] == 0 {
        b','
    } else {
        DELIMITER_CANDIDATES[best]
    }
}
