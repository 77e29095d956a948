//! Display and parsing helpers shared by the views

use chrono::{NaiveDate, NaiveDateTime};

/// Date layouts accepted for stored admission dates, in the order tried
pub const STORED_DATE_FORMATS: [&str; 5] = ["%d/%m/%Y", "%Y-%m-%d", "%m/%d/%Y", "%Y%m%d", "%d-%m-%Y"];

/// Indonesian rupiah display: `Rp. 1.234.567`
///
/// The value is truncated toward zero. Zero and non-finite values render as
/// `Rp. 0`.
///
/// ```
/// use claimrecon::core::views::format::format_rupiah;
///
/// assert_eq!(format_rupiah(1_234_567.89), "Rp. 1.234.567");
/// assert_eq!(format_rupiah(-1_500.0), "Rp. -1.500");
/// assert_eq!(format_rupiah(f64::NAN), "Rp. 0");
/// ```
pub fn format_rupiah(value: f64) -> String {
    if !value.is_finite() {
        return "Rp. 0".to_string();
    }
    let whole = value.trunc() as i64;
    if whole == 0 {
        return "Rp. 0".to_string();
    }

    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if whole < 0 {
        format!("Rp. -{grouped}")
    } else {
        format!("Rp. {grouped}")
    }
}

/// Rounds half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `numerator / denominator`, or 0 when the denominator is 0
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Splits a `;`-delimited diagnosis list into primary and secondary parts
pub fn split_diagnosis(diaglist: &str) -> (String, String) {
    match diaglist.split_once(';') {
        Some((primary, rest)) => (primary.trim().to_string(), rest.trim().to_string()),
        None => (diaglist.trim().to_string(), String::new()),
    }
}

/// Human label for a discharge-status code; unknown codes pass through
pub fn discharge_label(code: &str) -> String {
    match code.trim() {
        "1" => "physician-approved".to_string(),
        "2" => "referred out".to_string(),
        "3" => "self-discharged".to_string(),
        "4" => "deceased".to_string(),
        other => other.to_string(),
    }
}

/// Parses a stored date, optionally followed by ` HH:MM:SS`
pub fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    parse_date_with(raw, &STORED_DATE_FORMATS)
}

/// Parses `raw` with the first matching layout
pub fn parse_date_with(raw: &str, formats: &[&str]) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
        let with_time = format!("{format} %H:%M:%S");
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, &with_time) {
            return Some(datetime.date());
        }
    }
    None
}
