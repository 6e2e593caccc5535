//! Qt date/time encodings
//!
//! `QDateTime` travels as a Julian day number, milliseconds since midnight and
//! a time-spec byte. `QTime` is only the milliseconds since midnight, so the
//! date has to come from the receiver.
//!
//! Sub-second precision is dropped in both cases: only `ms / 1000` whole
//! seconds are added to midnight.

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};

use crate::core::{Error, Result};

/// Julian days beyond this are rejected before any arithmetic
const JULIAN_DAY_LIMIT: i64 = 1 << 40;

/// Julian day of 0000-12-31, the day before `num_days_from_ce` starts counting
const JULIAN_DAY_OF_CE: i64 = 1_721_425;

/// Time zone selector of a serialized `QDateTime`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimeSpec {
    LocalTime = 0,
    Utc = 1,
}

impl TryFrom<u8> for TimeSpec {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(TimeSpec::LocalTime),
            1 => Ok(TimeSpec::Utc),
            other => Err(Error::InvalidDateTimeSpec(other)),
        }
    }
}

/// Converts a Julian day number to a proleptic Gregorian date
///
/// Integer algorithm after Richards, as used by `QDate::fromJulianDay`. Years
/// are astronomical (1 BC is year 0).
pub fn date_from_julian_day(julian_day: u64) -> Result<NaiveDate> {
    let jd = i64::try_from(julian_day)
        .ok()
        .filter(|jd| *jd <= JULIAN_DAY_LIMIT)
        .ok_or(Error::DateOutOfRange(julian_day))?;

    let a = jd + 32044;
    let b = (4 * a + 3).div_euclid(146_097);
    let c = a - (146_097 * b).div_euclid(4);
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);

    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * m.div_euclid(10);
    let year = 100 * b + d - 4800 + m.div_euclid(10);

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month as u32, day as u32))
        .ok_or(Error::DateOutOfRange(julian_day))
}

/// Julian day number of a date, the inverse of [`date_from_julian_day`]
pub fn julian_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) + JULIAN_DAY_OF_CE
}

/// Builds the UTC instant of a serialized `QDateTime`
///
/// Fails with `DateOutOfRange` when the date or the added time of day falls
/// outside what `chrono` can represent.
pub fn date_time(julian_day: u64, ms_since_midnight: u32, spec: TimeSpec) -> Result<DateTime<Utc>> {
    let date = date_from_julian_day(julian_day)?;
    let midnight = match spec {
        TimeSpec::Utc => Some(utc_midnight(date)),
        TimeSpec::LocalTime => local_midnight(date),
    };
    midnight
        .and_then(|midnight| midnight.checked_add_signed(whole_seconds(ms_since_midnight)))
        .ok_or(Error::DateOutOfRange(julian_day))
}

/// Places a `QTime` on the given day, in UTC
pub fn time_of_day(today: NaiveDate, ms_since_midnight: u32) -> Result<DateTime<Utc>> {
    utc_midnight(today)
        .checked_add_signed(whole_seconds(ms_since_midnight))
        .ok_or_else(|| Error::DateOutOfRange(u64::try_from(julian_day(today)).unwrap_or(0)))
}

fn whole_seconds(ms: u32) -> Duration {
    Duration::seconds(i64::from(ms / 1000))
}

fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    let offset = match Local.offset_from_local_datetime(&midnight) {
        LocalResult::Single(offset) => offset,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // midnight skipped by a DST jump: use the offset in force right after it
        LocalResult::None => Local.offset_from_utc_datetime(&midnight),
    };
    let utc = midnight.checked_sub_signed(Duration::seconds(i64::from(offset.fix().local_minus_utc())))?;
    Some(Utc.from_utc_datetime(&utc))
}
