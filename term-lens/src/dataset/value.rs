//! Cell values and the parse helpers shared by every analyzer and transform.
//!
//! Type inference, health profiling, filtering and aggregation all go through
//! [`CellValue::parse_number`], [`CellValue::parse_date`],
//! [`CellValue::is_missing`] and the [`Display`](std::fmt::Display) impl, so a
//! value is numeric (or date-like, or missing) in exactly the same way
//! everywhere.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent value
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Shared `Null` for lookups of absent keys.
pub(crate) static NULL: CellValue = CellValue::Null;

static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<year>\d{4})(?:-(?P<month>\d{1,2}))?$").expect("year/month pattern is valid")
});

/// Layouts accepted for values carrying both a date and a time.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%b %d %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

/// Layouts accepted for plain calendar dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%a %b %d %Y",
];

impl CellValue {
    /// Returns true for `Null` and for the empty string.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Parses the cell as a finite number.
    ///
    /// Text must parse in full after trimming surrounding whitespace; partial
    /// prefixes such as `"12abc"` are rejected, as are `inf` and `NaN`.
    pub fn parse_number(&self) -> Option<f64> {
        let parsed = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || !looks_numeric(trimmed) {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            CellValue::Null | CellValue::Bool(_) => return None,
        };
        parsed.is_finite().then_some(parsed)
    }

    /// Parses the cell as a calendar date or date-time.
    ///
    /// Only text is considered date-like. Accepted shapes cover ISO 8601 and
    /// RFC 3339 (including bare `YYYY` and `YYYY-MM`), RFC 2822, slash
    /// separated US dates and month-name dates.
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Text(s) => parse_date_str(s.trim()),
            _ => None,
        }
    }

    /// Returns the text when the cell holds a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Rejects the textual spellings `str::parse::<f64>` accepts but a numeric
/// cell never means (`inf`, `infinity`, `nan`).
fn looks_numeric(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = YEAR_MONTH.captures(s) {
        let year = caps["year"].parse::<i32>().ok()?;
        let month = match caps.name("month") {
            Some(m) => m.as_str().parse::<u32>().ok()?,
            None => 1,
        };
        return NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.and_time(NaiveTime::MIN));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("null"),
            CellValue::Bool(b) => write!(f, "{b}"),
            // -0 prints as 0 so the two never land in different groups.
            CellValue::Number(n) if *n == 0.0 => f.write_str("0"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sentinels() {
        assert!(CellValue::Null.is_missing());
        assert!(CellValue::from("").is_missing());
        assert!(!CellValue::from(" ").is_missing());
        assert!(!CellValue::from(0.0).is_missing());
        assert!(!CellValue::from(false).is_missing());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(CellValue::from("42").parse_number(), Some(42.0));
        assert_eq!(CellValue::from("  -3.5 ").parse_number(), Some(-3.5));
        assert_eq!(CellValue::from("+7").parse_number(), Some(7.0));
        assert_eq!(CellValue::from(".5").parse_number(), Some(0.5));
        assert_eq!(CellValue::from("1e3").parse_number(), Some(1000.0));
        assert_eq!(CellValue::from(12.25).parse_number(), Some(12.25));

        assert_eq!(CellValue::from("12abc").parse_number(), None);
        assert_eq!(CellValue::from("inf").parse_number(), None);
        assert_eq!(CellValue::from("NaN").parse_number(), None);
        assert_eq!(CellValue::from("1e999").parse_number(), None);
        assert_eq!(CellValue::from(f64::NAN).parse_number(), None);
        assert_eq!(CellValue::from(true).parse_number(), None);
        assert_eq!(CellValue::Null.parse_number(), None);
        assert_eq!(CellValue::from("").parse_number(), None);
    }

    #[test]
    fn test_parse_date_shapes() {
        let accepted = [
            "2023-12-25",
            "2023-12-25T10:30:00",
            "2023-12-25T10:30:00.123",
            "2023-12-25 10:30",
            "2023-12-25T10:30:00Z",
            "2023-12-25T10:30:00+02:00",
            "2023/12/25",
            "12/25/2023",
            "1/5/2023 3:45 PM",
            "Dec 25 2023",
            "Dec 25, 2023",
            "December 25, 2023",
            "25 Dec 2023",
            "Mon, 25 Dec 2023 10:30:00 +0000",
            "2023",
            "2023-07",
        ];
        for value in accepted {
            assert!(
                CellValue::from(value).parse_date().is_some(),
                "expected date-like: {value}"
            );
        }

        let rejected = ["hello", "2023-13-45", "12/45/2023", "", "abc 2023"];
        for value in rejected {
            assert!(
                CellValue::from(value).parse_date().is_none(),
                "expected not date-like: {value}"
            );
        }

        assert!(CellValue::from(20231225.0).parse_date().is_none());
    }

    #[test]
    fn test_display_stringification() {
        assert_eq!(CellValue::from(10.0).to_string(), "10");
        assert_eq!(CellValue::from(1.5).to_string(), "1.5");
        assert_eq!(CellValue::from(-0.0).to_string(), "0");
        assert_eq!(CellValue::from(true).to_string(), "true");
        assert_eq!(CellValue::Null.to_string(), "null");
        assert_eq!(CellValue::from("x").to_string(), "x");
    }

    #[test]
    fn test_serde_untagged() {
        let cells = vec![
            CellValue::Null,
            CellValue::from(true),
            CellValue::from(2.5),
            CellValue::from("a"),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,true,2.5,"a"]"#);
        let back: Vec<CellValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }
}
