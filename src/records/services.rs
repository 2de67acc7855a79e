use time::{macros::format_description, Date, PrimitiveDateTime};

use crate::error::DataError;

/// Parses a calendar date written as `YYYY-MM-DD`.
pub(crate) fn parse_date(raw: &str) -> Result<Date, DataError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| DataError::validation(format!("{raw:?} is not a YYYY-MM-DD date: {e}")))
}

/// Parses a claim timestamp written as `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn parse_timestamp(raw: &str) -> Result<PrimitiveDateTime, DataError> {
    PrimitiveDateTime::parse(
        raw.trim(),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|e| {
        DataError::validation(format!(
            "{raw:?} is not a YYYY-MM-DD HH:MM:SS timestamp: {e}"
        ))
    })
}

pub(crate) fn require_non_empty<'a>(field: &str, raw: &'a str) -> Result<&'a str, DataError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DataError::validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let d = parse_date("2024-06-01").unwrap();
        assert_eq!(d.year(), 2024);
        assert_eq!(u8::from(d.month()), 6);
        assert!(parse_date(" 2024-01-01 ").is_ok());
    }

    #[test]
    fn rejects_malformed_dates() {
        for raw in ["", "2024-13-01", "2024-02-30", "01/06/2024", "2024-06-01'; DROP TABLE Claims; --"] {
            assert!(
                matches!(parse_date(raw), Err(DataError::Validation(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn parses_timestamps() {
        assert!(parse_timestamp("2024-01-02 10:00:00").is_ok());
        assert!(parse_timestamp("2024-01-02T10:00:00").is_err());
        assert!(parse_timestamp("2024-01-02").is_err());
    }

    #[test]
    fn require_non_empty_trims() {
        assert_eq!(require_non_empty("city", "  CityX ").unwrap(), "CityX");
        let err = require_non_empty("city", "   ").unwrap_err();
        assert_eq!(err.to_string(), "invalid input: city must not be empty");
    }
}
