//! Civil local time → UTC instant and Julian day.
//!
//! Conversion uses the zone's real transition rules via `chrono-tz`, so
//! daylight-saving boundaries behave correctly for any historical or future
//! date. The Julian day follows the proleptic Gregorian convention with the
//! fractional day taken from `hour + minute/60 + second/3600`.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::EngineError;

/// JD of the J2000.0 epoch (2000-01-01 12:00 UT).
pub const J2000_JD: f64 = 2_451_545.0;

/// A birth instant resolved against its timezone.
#[derive(Debug, Clone)]
pub struct TimeContext {
    pub utc: DateTime<Utc>,
    pub local_iso: String,
    pub utc_iso: String,
    pub offset_minutes: i32,
    pub dst: bool,
    pub jd_ut: f64,
}

/// Resolve a civil date (`YYYY-MM-DD`), local time (`HH:MM`), and IANA zone
/// identifier into a [`TimeContext`].
pub fn resolve_local(date: &str, time: &str, tzid: &str) -> Result<TimeContext, EngineError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidTimeInput(format!("invalid birth_date '{}': {}", date, e)))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|e| EngineError::InvalidTimeInput(format!("invalid birth_time_local '{}': {}", time, e)))?;
    let tz: Tz = tzid
        .parse()
        .map_err(|_| EngineError::InvalidTimeInput(format!("unknown timezone id '{}'", tzid)))?;

    let naive = NaiveDateTime::new(date, time);
    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        // Fall-back transition: the wall clock repeats; take the earlier instant.
        LocalResult::Ambiguous(earlier, _later) => earlier,
        LocalResult::None => {
            return Err(EngineError::InvalidTimeInput(format!(
                "local time {} does not exist in {} (DST gap)",
                naive, tzid
            )))
        }
    };

    let offset = local.offset();
    let dst = !offset.dst_offset().is_zero();
    let offset_minutes = offset.fix().local_minus_utc() / 60;
    let utc = local.with_timezone(&Utc);

    Ok(TimeContext {
        local_iso: local.to_rfc3339_opts(SecondsFormat::Secs, false),
        utc_iso: utc.to_rfc3339_opts(SecondsFormat::Secs, true),
        jd_ut: julian_day(&utc),
        offset_minutes,
        dst,
        utc,
    })
}

/// Julian day (UT) of a UTC instant, proleptic Gregorian.
pub fn julian_day(utc: &DateTime<Utc>) -> f64 {
    let mut y = utc.year() as f64;
    let mut m = utc.month() as f64;
    if m <= 2.0 {
        y -= 1.0;
        m += 12.0;
    }
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    let day = utc.day() as f64;
    let ut_hours =
        utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0;

    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day + b - 1524.5
        + ut_hours / 24.0
}
