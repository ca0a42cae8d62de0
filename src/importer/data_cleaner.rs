// ==========================================
// Training Ingest - lenient value cleaning
// ==========================================
// TRIM / NULL normalization / lenient numeric and date coercion.
// Invalid values become None; callers decide between "drop the row"
// (required field) and "store NULL" (optional field).
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};

pub struct DataCleaner;

/// Date-only formats accepted by `parse_date_lenient`.
///
/// Slash and dash dates are day-first, as the exports write them:
/// `01/02/2024` is 1 February. No month-first format is accepted.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%Y%m%d"];

/// Date-time formats whose date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

impl DataCleaner {
    /// Trims; empty or whitespace-only becomes None.
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// Integer coercion.
    ///
    /// Accepts "42", " 42 ", "42.0", "4.2e1"; rejects fractional,
    /// non-finite and non-numeric text.
    pub fn parse_integer_lenient(&self, value: &str) -> Option<i64> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(i);
        }

        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some(f as i64)
            }
            _ => None,
        }
    }

    /// Date coercion; date-times keep only their date.
    pub fn parse_date_lenient(&self, value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                    .map(|dt| dt.date())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ")), None);
        assert_eq!(cleaner.normalize_null(Some("")), None);
        assert_eq!(cleaner.normalize_null(Some("  valor  ")), Some("valor".to_string()));
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_parse_integer_lenient() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_integer_lenient("1000123"), Some(1000123));
        assert_eq!(cleaner.parse_integer_lenient(" 51 "), Some(51));
        assert_eq!(cleaner.parse_integer_lenient("880.0"), Some(880));
        assert_eq!(cleaner.parse_integer_lenient("-3"), Some(-3));
        assert_eq!(cleaner.parse_integer_lenient("2.5"), None);
        assert_eq!(cleaner.parse_integer_lenient("N/A"), None);
        assert_eq!(cleaner.parse_integer_lenient("NaN"), None);
        assert_eq!(cleaner.parse_integer_lenient("inf"), None);
        assert_eq!(cleaner.parse_integer_lenient(""), None);
    }

    #[test]
    fn test_parse_date_lenient() {
        let cleaner = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);

        assert_eq!(cleaner.parse_date_lenient("2024-01-15"), expected);
        assert_eq!(cleaner.parse_date_lenient("15/01/2024"), expected);
        assert_eq!(cleaner.parse_date_lenient("2024/01/15"), expected);
        assert_eq!(cleaner.parse_date_lenient("20240115"), expected);
        assert_eq!(cleaner.parse_date_lenient("2024-01-15 00:00:00"), expected);
        assert_eq!(cleaner.parse_date_lenient("2024-01-15T08:30:00"), expected);
    }

    #[test]
    fn test_parse_date_lenient_is_day_first() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.parse_date_lenient("01/02/2024"),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert_eq!(
            cleaner.parse_date_lenient("01-02-2024"),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        // month 13 does not fall back to month-first
        assert_eq!(cleaner.parse_date_lenient("12/13/2024"), None);
    }

    #[test]
    fn test_parse_date_lenient_invalid() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_date_lenient("no es fecha"), None);
        assert_eq!(cleaner.parse_date_lenient("2024-13-45"), None);
        assert_eq!(cleaner.parse_date_lenient(""), None);
    }
}
