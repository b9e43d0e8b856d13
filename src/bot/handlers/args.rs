//! Parsing of free-text command arguments.

use crate::errors::{Error, Result};
use chrono::NaiveDate;

/// Parses a comma-separated list of ids, ignoring blanks.
pub fn parse_id_list(raw: &str, field: &'static str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>().map_err(|_| Error::Validation {
                field,
                message: format!("'{id}' is not a number"),
            })
        })
        .collect()
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| Error::Validation {
        field,
        message: format!("'{raw}' is not a date like 2025-03-14"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("12, 7,9,", "ids").unwrap(), vec![12, 7, 9]);
        assert!(parse_id_list("", "ids").unwrap().is_empty());
        assert!(matches!(
            parse_id_list("12,seven", "orders"),
            Err(Error::Validation { field: "orders", .. })
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 2025-03-14 ", "date").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
        assert!(matches!(
            parse_date("14-03-2025", "date"),
            Err(Error::Validation { field: "date", .. })
        ));
    }
}
