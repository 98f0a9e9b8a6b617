//! Date normalization helpers.
//!
//! Transactions store UTC timestamps. User input and daily reports work in
//! the business time zone (`Asia/Jakarta`).

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::{Asia::Jakarta, Tz};

use crate::{EngineError, ResultEngine};

/// Time zone of the business day.
pub const BUSINESS_TZ: Tz = Jakarta;

/// Parses a user supplied date.
///
/// Accepts RFC 3339 timestamps (`2024-03-01T10:15:00+07:00`) or a plain
/// `YYYY-MM-DD` date, which is taken as midnight of that business day.
pub fn parse_date(input: &str) -> ResultEngine<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("date must not be empty".to_string()));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| EngineError::Validation(format!("invalid date: {trimmed}")))?;
    start_of_day(day)
}

/// First instant of a business day, in UTC.
pub fn start_of_day(day: NaiveDate) -> ResultEngine<DateTime<Utc>> {
    BUSINESS_TZ
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .earliest()
        .map(|ts| ts.with_timezone(&Utc))
        .ok_or_else(|| EngineError::Validation(format!("invalid local date: {day}")))
}

/// Business day a timestamp falls on.
#[must_use]
pub fn business_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&BUSINESS_TZ).date_naive()
}

/// Short `dd/mm/yyyy HH:MM` rendering used in listings.
#[must_use]
pub fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&BUSINESS_TZ)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_date_is_jakarta_midnight() {
        let ts = parse_date("2024-03-01").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-02-29T17:00:00+00:00");
        assert_eq!(business_day(ts), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn rfc3339_keeps_instant() {
        let ts = parse_date("2024-03-01T10:15:00+07:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T03:15:00+00:00");
        assert_eq!(format_local(ts), "01/03/2024 10:15");
    }

    #[test]
    fn late_utc_evening_is_next_business_day() {
        let ts = parse_date("2024-03-01T20:00:00Z").unwrap();
        assert_eq!(business_day(ts), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("").is_err());
        assert!(parse_date("01-03-2024").is_err());
    }
}
