//! Time utilities for the registry.
//!
//! Record timestamps are Unix epoch microseconds (u64). Birth dates are
//! stored as a second offset from the 1900-01-01T00:00:00Z base so that
//! the profile payload never carries a signed value.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{RegistryError, Result};

/// Calendar year the `DOB` offset is measured from.
pub const DOB_BASE_YEAR: i32 = 1900;

/// Return the current time as microseconds since Unix epoch.
pub fn now_micros() -> u64 {
    let micros = Utc::now().timestamp_micros();
    u64::try_from(micros).unwrap_or(0)
}

/// Convert microseconds to an RFC 3339 string.
pub fn micros_to_rfc3339(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    let nsecs = ((micros % 1_000_000) * 1000) as u32;
    let dt = DateTime::from_timestamp(secs, nsecs).unwrap_or(DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}

fn dob_base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(DOB_BASE_YEAR, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Convert a calendar date of birth into the stored `DOB` offset.
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` for dates before the base year.
pub fn dob_offset_from_date(date: NaiveDate) -> Result<u64> {
    let at_midnight = date.and_time(NaiveTime::MIN).and_utc();
    let offset = at_midnight.timestamp() - dob_base().timestamp();
    u64::try_from(offset).map_err(|_| {
        RegistryError::InvalidInput(format!(
            "date of birth {date} is before {DOB_BASE_YEAR}-01-01"
        ))
    })
}

/// Convert a stored `DOB` offset back to its calendar date.
pub fn date_from_dob_offset(offset: u64) -> NaiveDate {
    let secs = i64::try_from(offset).unwrap_or(i64::MAX);
    let dt = DateTime::from_timestamp(dob_base().timestamp().saturating_add(secs), 0)
        .unwrap_or(DateTime::UNIX_EPOCH);
    dt.date_naive()
}

/// Parse a `YYYY-MM-DD` date of birth into the stored `DOB` offset.
///
/// # Errors
///
/// Returns `RegistryError::InvalidInput` if the string is not a valid date
/// or the date is before the base year.
pub fn parse_dob(s: &str) -> Result<u64> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| RegistryError::InvalidInput(format!("invalid date of birth '{s}': {e}")))?;
    dob_offset_from_date(date)
}
