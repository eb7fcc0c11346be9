//! Calendar and clock conversions for the time-like well-known types.
use chrono::{Datelike, Days, NaiveDate};
use prost_types::{Duration, Timestamp};

use super::payload::{Date, TimeOfDay};

const NANOS_PER_MICRO: i64 = 1_000;
const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RangeError(pub(crate) Box<str>);

impl RangeError {
    fn new(reason: impl Into<Box<str>>) -> Self {
        Self(reason.into())
    }
}

/// 1970-01-01
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Microseconds since the unix epoch. Sub-microsecond precision is floored away, so the
/// result never lies after the timestamp.
pub fn timestamp_to_micros(ts: &Timestamp) -> Result<i64, RangeError> {
    let nanos = ts.seconds as i128 * 1_000_000_000 + ts.nanos as i128;
    let micros = nanos.div_euclid(NANOS_PER_MICRO as i128);

    i64::try_from(micros)
        .map_err(|_| RangeError::new(format!("{micros} microseconds overflows a long")))
}

pub fn micros_to_timestamp(micros: i64) -> Timestamp {
    Timestamp {
        seconds: micros.div_euclid(MICROS_PER_SECOND),
        nanos: (micros.rem_euclid(MICROS_PER_SECOND) * NANOS_PER_MICRO) as i32,
    }
}

pub fn nanos_to_timestamp(nanos: i64) -> Timestamp {
    const NANOS_PER_SECOND: i64 = 1_000_000_000;

    Timestamp {
        seconds: nanos.div_euclid(NANOS_PER_SECOND),
        nanos: nanos.rem_euclid(NANOS_PER_SECOND) as i32,
    }
}

/// Days between the unix epoch and `date`. Partial dates (a zero year, month or day) have no
/// single day to count to, and are rejected along with invalid ones.
pub fn date_to_days(date: &Date) -> Result<i32, RangeError> {
    let invalid = || {
        RangeError::new(format!(
            "{:04}-{:02}-{:02} is not a complete calendar date",
            date.year, date.month, date.day
        ))
    };

    let month = u32::try_from(date.month).map_err(|_| invalid())?;
    let day = u32::try_from(date.day).map_err(|_| invalid())?;

    if date.year == 0 {
        return Err(invalid());
    }

    let naive = NaiveDate::from_ymd_opt(date.year, month, day).ok_or_else(invalid)?;
    let days = naive.signed_duration_since(epoch()).num_days();

    i32::try_from(days).map_err(|_| RangeError::new(format!("{days} days overflows an int")))
}

pub fn days_to_date(days: i32) -> Result<Date, RangeError> {
    let offset = Days::new(days.unsigned_abs() as u64);

    let naive = if days >= 0 {
        epoch().checked_add_days(offset)
    } else {
        epoch().checked_sub_days(offset)
    }
    .ok_or_else(|| RangeError::new(format!("{days} days from the epoch is out of range")))?;

    Ok(Date {
        year: naive.year(),
        month: naive.month() as i32,
        day: naive.day() as i32,
    })
}

pub fn time_of_day_to_micros(time: &TimeOfDay) -> i64 {
    let seconds = time.hours as i64 * 3600 + time.minutes as i64 * 60 + time.seconds as i64;
    seconds * MICROS_PER_SECOND + time.nanos as i64 / NANOS_PER_MICRO
}

pub fn micros_to_time_of_day(micros: i64) -> Result<TimeOfDay, RangeError> {
    if micros < 0 {
        return Err(RangeError::new(format!(
            "{micros} is before midnight, a time of day cannot be negative"
        )));
    }

    let hours = micros / MICROS_PER_HOUR;
    let rem = micros - hours * MICROS_PER_HOUR;
    let minutes = rem / MICROS_PER_MINUTE;
    let rem = rem - minutes * MICROS_PER_MINUTE;
    let seconds = rem / MICROS_PER_SECOND;
    let rem = rem - seconds * MICROS_PER_SECOND;

    let hours = i32::try_from(hours)
        .map_err(|_| RangeError::new(format!("{micros} microseconds overflows a time of day")))?;

    Ok(TimeOfDay {
        hours,
        minutes: minutes as i32,
        seconds: seconds as i32,
        nanos: (rem * NANOS_PER_MICRO) as i32,
    })
}

/// Seconds in `duration`. The sum is built in whole microseconds, and only divided into
/// floating point seconds at the end.
pub fn duration_to_seconds(duration: &Duration) -> Result<f32, RangeError> {
    let micros = duration
        .seconds
        .checked_mul(MICROS_PER_SECOND)
        .and_then(|micros| micros.checked_add(duration.nanos as i64 / NANOS_PER_MICRO))
        .ok_or_else(|| {
            RangeError::new(format!(
                "{}s {}ns overflows a microsecond count",
                duration.seconds, duration.nanos
            ))
        })?;

    Ok((micros as f64 / MICROS_PER_SECOND as f64) as f32)
}

/// Converts (possibly fractional) seconds to a duration, going through the nearest whole
/// microsecond. Seconds and nanos always share a sign.
pub fn seconds_to_duration(seconds: f64) -> Result<Duration, RangeError> {
    let micros = (seconds * MICROS_PER_SECOND as f64).round();

    if !micros.is_finite() || micros < i64::MIN as f64 || micros >= i64::MAX as f64 {
        return Err(RangeError::new(format!(
            "{seconds} seconds does not fit a duration"
        )));
    }

    let micros = micros as i64;

    Ok(Duration {
        seconds: micros / MICROS_PER_SECOND,
        nanos: ((micros % MICROS_PER_SECOND) * NANOS_PER_MICRO) as i32,
    })
}
