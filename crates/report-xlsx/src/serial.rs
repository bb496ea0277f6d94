//! Spreadsheet date serials.
//!
//! Report generators emit OLE Automation dates: days since 1899-12-30 with the
//! time of day as the fractional part. Negative serials count backwards by
//! whole days while the fraction still moves forward in time.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Largest serial (exclusive) with a representable calendar date: 9999-12-31 + 1 day.
pub const MAX_OLE_SERIAL: f64 = 2_958_466.0;
/// Smallest serial: 0100-01-01.
pub const MIN_OLE_SERIAL: f64 = -657_435.0;

fn ole_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid OLE epoch")
}

/// Convert an OLE Automation serial into a calendar date/time.
///
/// Returns `None` for non-finite or out-of-range serials.
pub fn from_ole_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(MIN_OLE_SERIAL..MAX_OLE_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.trunc();
    let fraction = (serial - days).abs();
    let millis = (fraction * MILLIS_PER_DAY).round() as i64;

    ole_epoch()
        .checked_add_signed(TimeDelta::try_days(days as i64)?)?
        .checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// Convert a calendar date/time back to an OLE Automation serial.
pub fn to_ole_serial(datetime: NaiveDateTime) -> f64 {
    let delta = datetime - ole_epoch();
    let millis = delta.num_milliseconds();
    let days = millis.div_euclid(86_400_000);
    let rem = millis.rem_euclid(86_400_000) as f64 / MILLIS_PER_DAY;
    if days < 0 {
        // OLE negatives: -1.25 is 1899-12-29 06:00, not 1899-12-28 18:00.
        days as f64 - rem
    } else {
        days as f64 + rem
    }
}

/// The serial the spreadsheet stores for `datetime` in its 1900 date system.
///
/// It matches the OLE serial except between 1899-12-31 and 1900-02-28,
/// where the 1900 system is off by one because of its phantom 1900-02-29.
pub fn to_excel_serial(datetime: NaiveDateTime) -> f64 {
    let ole = to_ole_serial(datetime);
    if (1.0..61.0).contains(&ole) {
        ole - 1.0
    } else {
        ole
    }
}
