//! Date and time literal parsing
//!
//! Accepted shapes, shared by [`parse_date_time`] and [`parse_timestamp`]:
//! - `2021-02-05` (midnight)
//! - `2021-02-05T10:15`
//! - `2021-02-05T10:15:16`
//! - `2021-02-05T10:15:16.17`
//!
//! The two differ in how the digits after the dot are read. A date-time treats
//! them as a decimal fraction of a second, so `.17` is 170ms. A timestamp
//! treats them as a whole number of milliseconds, so `.17` is 17ms.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::CoercionError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_FRACTION_DIGITS: usize = 9;

/// Parse a calendar date, `YYYY-MM-DD`
pub fn parse_date(literal: &str) -> Result<NaiveDate, CoercionError> {
    NaiveDate::parse_from_str(literal, DATE_FORMAT).map_err(|_| invalid(literal, "a date"))
}

/// Parse a zone-less date-time with nanosecond precision
pub fn parse_date_time(literal: &str) -> Result<NaiveDateTime, CoercionError> {
    let expected = "a date-time";
    let parts = split(literal, expected)?;

    let nanos = match parts.fraction {
        None => 0,
        Some(digits) => {
            // right-pad to nine digits: "17" -> 170_000_000
            let padded = format!("{digits:0<width$}", width = MAX_FRACTION_DIGITS);
            padded
                .parse::<u32>()
                .map_err(|_| invalid(literal, expected))?
        }
    };

    let time = parts
        .time
        .with_nanosecond(nanos)
        .ok_or_else(|| invalid(literal, expected))?;

    Ok(parts.date.and_time(time))
}

/// Parse an instant in the local time zone; fractional digits are milliseconds
pub fn parse_timestamp(literal: &str) -> Result<DateTime<Local>, CoercionError> {
    let expected = "a timestamp";
    let parts = split(literal, expected)?;

    let millis = match parts.fraction {
        None => 0,
        Some(digits) => digits
            .parse::<i64>()
            .map_err(|_| invalid(literal, expected))?,
    };

    let naive = parts
        .date
        .and_time(parts.time)
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(|| invalid(literal, expected))?;

    // a wall-clock time skipped by a DST transition has no local instant
    naive
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| invalid(literal, expected))
}

struct Parts<'a> {
    date: NaiveDate,
    time: NaiveTime,
    fraction: Option<&'a str>,
}

fn split<'a>(literal: &'a str, expected: &str) -> Result<Parts<'a>, CoercionError> {
    let (date, rest) = match literal.split_once('T') {
        Some((date, rest)) => (date, Some(rest)),
        None => (literal, None),
    };

    let date =
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid(literal, expected))?;

    let Some(rest) = rest else {
        return Ok(Parts {
            date,
            time: NaiveTime::MIN,
            fraction: None,
        });
    };

    let (clock, fraction) = match rest.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (rest, None),
    };

    if let Some(digits) = fraction {
        let well_formed = !digits.is_empty()
            && digits.len() <= MAX_FRACTION_DIGITS
            && digits.bytes().all(|b| b.is_ascii_digit());
        // a fraction needs seconds in front of it
        if !well_formed || clock.len() != "HH:MM:SS".len() {
            return Err(invalid(literal, expected));
        }
    }

    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .map_err(|_| invalid(literal, expected))?;

    Ok(Parts {
        date,
        time,
        fraction,
    })
}

fn invalid(literal: &str, expected: &str) -> CoercionError {
    CoercionError::new(literal, expected)
}
