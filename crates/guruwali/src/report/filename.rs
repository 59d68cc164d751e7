//! File names for exported reports.

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::config::DEFAULT_DATE_FORMAT;

/// Separator between file name parts and replacement for whitespace.
pub const SEPARATOR: &str = "_";

/// Extension of exported documents.
pub const EXTENSION: &str = "doc";

fn whitespace() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s").expect("whitespace pattern is a valid regex"))
}

fn path_hostile() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("path pattern is a valid regex")
    })
}

/// Make one file name part safe: every whitespace character becomes `_`,
/// characters that are not allowed in file names become `-`.
#[must_use]
pub fn sanitize_part(part: &str) -> String {
    let spaced = whitespace().replace_all(part, SEPARATOR);
    path_hostile().replace_all(&spaced, "-").into_owned()
}

/// Render `date` with `format`, falling back to the default format when the
/// pattern is invalid.
#[must_use]
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        warn!(format, "invalid report date format, using default");
        out.clear();
        let _ = write!(out, "{}", date.format(DEFAULT_DATE_FORMAT));
    }
    out
}

/// Build `<prefix>_<label>_<date>.doc`. The label part is omitted when `None`.
#[must_use]
pub fn report_filename(prefix: &str, label: Option<&str>, date: NaiveDate, date_format: &str) -> String {
    let mut parts = vec![sanitize_part(prefix)];
    if let Some(label) = label {
        parts.push(sanitize_part(label));
    }
    parts.push(sanitize_part(&format_date(date, date_format)));
    format!("{}.{EXTENSION}", parts.join(SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 16).unwrap()
    }

    #[test]
    fn test_filter_label_whitespace_replaced() {
        assert_eq!(
            report_filename("Jurnal_Bimbingan", Some("Individual & Klasikal"), date(), "%d-%m-%Y"),
            "Jurnal_Bimbingan_Individual_&_Klasikal_16-10-2024.doc"
        );
    }

    #[test]
    fn test_each_whitespace_character_replaced() {
        assert_eq!(sanitize_part("a  b\tc"), "a__b_c");
    }

    #[test]
    fn test_without_label() {
        assert_eq!(
            report_filename("Daftar_Siswa", None, date(), "%d-%m-%Y"),
            "Daftar_Siswa_16-10-2024.doc"
        );
    }

    #[test]
    fn test_slashes_in_date_are_replaced() {
        assert_eq!(
            report_filename("Daftar_Siswa", None, date(), "%d/%m/%Y"),
            "Daftar_Siswa_16-10-2024.doc"
        );
    }

    #[test]
    fn test_invalid_format_falls_back() {
        assert_eq!(format_date(date(), "%Q"), "16-10-2024");
    }
}
