// src/dates.rs

//! Lenient date handling shared by the row codecs, the status reconciliation
//! engine and the Excel import pipeline.
//!
//! The historical sheets contain a mix of formats, so parsing tries them in a
//! fixed priority order: ISO `yyyy-MM-dd`, legacy `dd-MM-yyyy`, legacy
//! `dd-MM-yyyy HH:mm`, import `dd.MM.yyyy`. A cell that matches none of them
//! counts as "no date"; callers must tolerate missing dates without failing.

use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Canonical cell format for all date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date cell, tolerating every format the sheets have ever used.
pub fn parse_lenient(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%d-%m-%Y %H:%M").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .ok()
}

/// Serialize an optional date into its row cell. Absent dates serialize to an
/// empty string, never an omitted column.
pub fn date_cell(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

/// RFC 3339 timestamp for the notification, audit and import-status rows.
pub fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_iso() {
        assert_eq!(parse_lenient("2024-05-10"), Some(d(2024, 5, 10)));
    }

    #[test]
    fn parses_legacy_day_first() {
        assert_eq!(parse_lenient("10-05-2024"), Some(d(2024, 5, 10)));
    }

    #[test]
    fn parses_legacy_with_time() {
        assert_eq!(parse_lenient("10-05-2024 13:45"), Some(d(2024, 5, 10)));
    }

    #[test]
    fn parses_import_dotted() {
        assert_eq!(parse_lenient("10.05.2024"), Some(d(2024, 5, 10)));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(parse_lenient("  2024-01-02  "), Some(d(2024, 1, 2)));
    }

    #[test]
    fn garbage_and_empty_are_none() {
        assert_eq!(parse_lenient(""), None);
        assert_eq!(parse_lenient("   "), None);
        assert_eq!(parse_lenient("soon"), None);
        assert_eq!(parse_lenient("2024-13-40"), None);
        assert_eq!(parse_lenient("31-02-2024"), None);
    }

    #[test]
    fn date_cell_round_trip() {
        assert_eq!(date_cell(Some(d(2024, 5, 10))), "2024-05-10");
        assert_eq!(date_cell(None), "");
    }
}
