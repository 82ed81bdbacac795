//! Cell value parsing shared by the profiler and the execution engines.
//!
//! Type *inference* happens once in the profiler; these helpers only parse
//! individual cells according to an already-decided semantic type.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Date shapes accepted before attempting a full calendar-date parse.
static DATE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap(), "%Y-%m-%d"),
        (Regex::new(r"^\d{4}/\d{2}/\d{2}$").unwrap(), "%Y/%m/%d"),
        (Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap(), "%m/%d/%Y"),
    ]
});

/// Strip grouping separators so `1,000` parses as a number.
pub fn normalize_numeric(value: &str) -> String {
    value.trim().replace(',', "")
}

/// Parse a cell as a number, tolerating thousands separators.
pub fn parse_number(value: &str) -> Option<f64> {
    let stripped = normalize_numeric(value);
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a cell as a calendar date. Shapes are matched first so that plain
/// numbers never reach the chrono parser.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    for (pattern, format) in DATE_PATTERNS.iter() {
        if pattern.is_match(trimmed) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Some(date);
            }
        }
    }
    None
}

/// Parse a cell as a boolean from the closed vocabulary
/// `true/false/yes/no/1/0` (case-insensitive).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Whether a cell belongs to the boolean vocabulary at all.
pub fn is_boolean_token(value: &str) -> bool {
    parse_bool(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_with_separators() {
        assert_eq!(parse_number("1,000"), Some(1000.0));
        assert_eq!(parse_number(" 2,500.75 "), Some(2500.75));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("20240115").is_none());
        assert!(parse_date("1000").is_none());
    }

    #[test]
    fn test_parse_date_slash_formats() {
        assert!(parse_date("2024/02/20").is_some());
        assert!(parse_date("02/20/2024").is_some());
    }

    #[test]
    fn test_parse_bool_vocabulary() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
