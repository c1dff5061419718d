//! Time module for astronomical time calculations
//!
//! Instants are carried as Terrestrial Time (TT) Julian dates split into a
//! whole part and a day fraction, which keeps sub-millisecond resolution over
//! the multi-century spans covered by planetary ephemerides. The ephemeris
//! readers want Barycentric Dynamical Time (TDB); [`Time::tdb`] and
//! [`Time::tdb_split`] provide it through the USNO Circular 179 series.

use crate::constants::{DAY_S, GREGORIAN_START, J2000, TT_MINUS_TAI, UNIX_EPOCH_JD};
use crate::jplephem::calendar::{calendar_date, julian_day_number};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use std::fmt;
use std::ops::{Add, Sub};
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Time out of range: {0}")]
    OutOfRange(String),

    #[error("Calendar error: {0}")]
    CalendarError(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// TAI - UTC in seconds, keyed by the UTC Julian date on which it took effect
const LEAP_SECONDS: &[(f64, i32)] = &[
    (2441317.5, 10), // 1972-01-01
    (2441499.5, 11), // 1972-07-01
    (2441683.5, 12), // 1973-01-01
    (2442048.5, 13), // 1974-01-01
    (2442413.5, 14), // 1975-01-01
    (2442778.5, 15), // 1976-01-01
    (2443144.5, 16), // 1977-01-01
    (2443509.5, 17), // 1978-01-01
    (2443874.5, 18), // 1979-01-01
    (2444239.5, 19), // 1980-01-01
    (2444786.5, 20), // 1981-07-01
    (2445151.5, 21), // 1982-07-01
    (2445516.5, 22), // 1983-07-01
    (2446247.5, 23), // 1985-07-01
    (2447161.5, 24), // 1988-01-01
    (2447892.5, 25), // 1990-01-01
    (2448257.5, 26), // 1991-01-01
    (2448804.5, 27), // 1992-07-01
    (2449169.5, 28), // 1993-07-01
    (2449534.5, 29), // 1994-07-01
    (2450083.5, 30), // 1996-01-01
    (2450630.5, 31), // 1997-07-01
    (2451179.5, 32), // 1999-01-01
    (2453736.5, 33), // 2006-01-01
    (2454832.5, 34), // 2009-01-01
    (2456109.5, 35), // 2012-07-01
    (2457204.5, 36), // 2015-07-01
    (2457754.5, 37), // 2017-01-01
];

/// Calendar tuple for representing a date and time
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarTuple {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

/// Converts civil (UTC) dates into [`Time`] values
///
/// UTC before 1972 has no leap-second definition; the first table entry is
/// used for earlier dates.
#[derive(Debug, Clone)]
pub struct Timescale {
    /// UTC Julian dates at which a new TAI - UTC offset takes effect
    leap_dates: Vec<f64>,
    /// TAI - UTC offsets in seconds
    leap_offsets: Vec<i32>,
    /// Julian day number before which the Julian calendar applies
    julian_calendar_cutoff: Option<i32>,
}

impl Default for Timescale {
    fn default() -> Self {
        let (leap_dates, leap_offsets) = LEAP_SECONDS.iter().copied().unzip();
        Self::new(leap_dates, leap_offsets, Some(GREGORIAN_START))
    }
}

impl Timescale {
    /// Create a timescale from a leap second table
    pub fn new(
        leap_dates: Vec<f64>,
        leap_offsets: Vec<i32>,
        julian_calendar_cutoff: Option<i32>,
    ) -> Self {
        Self {
            leap_dates,
            leap_offsets,
            julian_calendar_cutoff,
        }
    }

    /// Get the current time
    pub fn now(&self) -> Time {
        self.from_datetime(Utc::now())
    }

    /// Create a time from a UTC datetime
    pub fn from_datetime(&self, dt: DateTime<Utc>) -> Time {
        self.utc((
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second() as f64 + dt.nanosecond() as f64 / 1_000_000_000.0,
        ))
    }

    /// Create a time from a UTC calendar date and time
    pub fn utc(&self, (year, month, day, hour, minute, second): (i32, u32, u32, u32, u32, f64)) -> Time {
        // Julian day numbers are counted from noon
        let whole = self.julian_day(year, month, day) as f64 - 0.5;
        let seconds_of_day = hour as f64 * 3600.0 + minute as f64 * 60.0 + second;
        let leap = self.leap_offset(whole + seconds_of_day / DAY_S);

        Time {
            whole,
            tt_fraction: (seconds_of_day + leap) / DAY_S + TT_MINUS_TAI,
        }
    }

    /// Create a time from a TT Julian date
    pub fn tt_jd(&self, jd: f64, fraction: Option<f64>) -> Time {
        Time::from_tt(jd, fraction)
    }

    /// Create a time from a TDB Julian date
    pub fn tdb_jd(&self, jd: f64) -> Time {
        let whole = jd.floor();
        let tt_fraction = jd - whole - tdb_minus_tt(jd) / DAY_S;
        Time { whole, tt_fraction }
    }

    /// Convert a time back to a UTC datetime
    pub fn to_datetime(&self, time: &Time) -> Result<DateTime<Utc>> {
        let tai = (time.whole - UNIX_EPOCH_JD) + (time.tt_fraction - TT_MINUS_TAI);
        let tai_jd = UNIX_EPOCH_JD + tai;
        let utc_days = tai - self.leap_offset_from_tai(tai_jd) / DAY_S;

        let seconds = utc_days * DAY_S;
        let whole_seconds = seconds.floor();
        let nanos = ((seconds - whole_seconds) * 1e9).round().min(999_999_999.0) as u32;

        DateTime::from_timestamp(whole_seconds as i64, nanos).ok_or_else(|| {
            TimeError::OutOfRange(format!("TT JD {:.6} is not a representable UTC instant", time.tt()))
        })
    }

    /// Calendar date for a Julian date, honouring the Julian/Gregorian cutoff
    pub fn jd_to_calendar(&self, jd: f64) -> CalendarTuple {
        let jd_plus_half = jd + 0.5;
        let z = jd_plus_half.floor();
        let seconds_in_day = (jd_plus_half - z) * DAY_S;

        let (year, month, day) = calendar_date(z as i32, self.julian_calendar_cutoff);
        let hour = (seconds_in_day / 3600.0).floor() as u32;
        let minute = ((seconds_in_day - hour as f64 * 3600.0) / 60.0).floor() as u32;
        let second = seconds_in_day - hour as f64 * 3600.0 - minute as f64 * 60.0;

        CalendarTuple {
            year,
            month: month as u32,
            day: day as u32,
            hour,
            minute,
            second,
        }
    }

    /// Julian day number (noon-based) of a calendar date
    pub fn julian_day(&self, year: i32, month: u32, day: u32) -> i32 {
        let jdn = julian_day_number(year, month as i32, day as i32);
        match self.julian_calendar_cutoff {
            Some(cutoff) if jdn < cutoff => julian_calendar_day(year, month as i32, day as i32),
            _ => jdn,
        }
    }

    /// TAI - UTC in seconds for a UTC Julian date
    fn leap_offset(&self, utc_jd: f64) -> f64 {
        let idx = self.leap_dates.partition_point(|&date| date <= utc_jd);
        self.offset_at(idx)
    }

    /// TAI - UTC in seconds for a TAI Julian date
    fn leap_offset_from_tai(&self, tai_jd: f64) -> f64 {
        let idx = self
            .leap_dates
            .iter()
            .zip(&self.leap_offsets)
            .take_while(|&(&date, &offset)| date + offset as f64 / DAY_S <= tai_jd)
            .count();
        self.offset_at(idx)
    }

    fn offset_at(&self, idx: usize) -> f64 {
        match idx {
            0 => self.leap_offsets.first().copied().unwrap_or(0) as f64,
            i => self.leap_offsets[i - 1] as f64,
        }
    }
}

/// Julian day number of a date in the Julian calendar
fn julian_calendar_day(year: i32, month: i32, day: i32) -> i32 {
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2) / 5 + 365 * y + y / 4 - 32083
}

/// TDB - TT in seconds (USNO Circular 179, eq. 2.6)
fn tdb_minus_tt(jd: f64) -> f64 {
    let t = (jd - J2000) / 36525.0;

    0.001657 * f64::sin(628.3076 * t + 6.2401)
        + 0.000022 * f64::sin(575.3385 * t + 4.2970)
        + 0.000014 * f64::sin(1256.6152 * t + 6.1969)
        + 0.000005 * f64::sin(606.9777 * t + 4.0212)
        + 0.000005 * f64::sin(52.9691 * t + 0.4444)
        + 0.000002 * f64::sin(21.3299 * t + 5.5431)
        + 0.000010 * t * f64::sin(628.3076 * t + 4.2490)
}

/// An instant, stored as a split TT Julian date
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// Whole part of the Julian date
    whole: f64,
    /// TT fraction of day (TT - whole)
    tt_fraction: f64,
}

impl Time {
    /// Create a time from a TT Julian date, optionally already split
    pub fn from_tt(jd: f64, fraction: Option<f64>) -> Self {
        let (whole, tt_fraction) = match fraction {
            Some(f) => (jd, f),
            None => {
                let whole = jd.floor();
                (whole, jd - whole)
            }
        };
        Self { whole, tt_fraction }
    }

    /// Create a time from a UTC datetime (convenience method)
    pub fn new(utc: DateTime<Utc>) -> Self {
        Timescale::default().from_datetime(utc)
    }

    /// Get the current time (convenience method)
    pub fn now() -> Self {
        Timescale::default().now()
    }

    /// Get the TT (Terrestrial Time) as Julian date
    pub fn tt(&self) -> f64 {
        self.whole + self.tt_fraction
    }

    /// Get the TDB (Barycentric Dynamical Time) as Julian date
    pub fn tdb(&self) -> f64 {
        let (whole, fraction) = self.tdb_split();
        whole + fraction
    }

    /// TDB Julian date as (whole, fraction), for readers that evaluate in two parts
    pub fn tdb_split(&self) -> (f64, f64) {
        (self.whole, self.tt_fraction + tdb_minus_tt(self.tt()) / DAY_S)
    }

    /// TDB seconds past J2000, the SPICE "ephemeris time"
    pub fn tdb_seconds_from_j2000(&self) -> f64 {
        let (whole, fraction) = self.tdb_split();
        ((whole - J2000) + fraction) * DAY_S
    }

    /// Get the TT as seconds since J2000.0
    pub fn tt_seconds_from_j2000(&self) -> f64 {
        ((self.whole - J2000) + self.tt_fraction) * DAY_S
    }

    /// Get the Julian Date
    pub fn jd(&self) -> f64 {
        self.tt()
    }

    /// Shift by a number of SI seconds
    pub fn add_seconds(self, seconds: f64) -> Self {
        self + seconds / DAY_S
    }
}

/// Equally spaced times from `t0` to `t1`, both ends included
pub fn linspace(t0: &Time, t1: &Time, num: usize) -> Vec<Time> {
    if num < 2 {
        return vec![*t0];
    }

    (0..num)
        .map(|i| {
            let t = i as f64 / (num - 1) as f64;
            Time {
                whole: t0.whole + t * (t1.whole - t0.whole),
                tt_fraction: t0.tt_fraction + t * (t1.tt_fraction - t0.tt_fraction),
            }
        })
        .collect()
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = Timescale::default();
        match ts.to_datetime(self) {
            Ok(dt) => write!(f, "{} (TT JD {:.6})", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ"), self.tt()),
            Err(_) => write!(f, "<Time tt={:.6}>", self.tt()),
        }
    }
}

impl Add<f64> for Time {
    type Output = Time;

    fn add(self, days: f64) -> Self::Output {
        let whole_days = days.floor();
        Time {
            whole: self.whole + whole_days,
            tt_fraction: self.tt_fraction + (days - whole_days),
        }
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, duration: Duration) -> Self::Output {
        let seconds = duration.num_seconds() as f64
            + duration.subsec_nanos() as f64 / 1_000_000_000.0;
        self.add_seconds(seconds)
    }
}

impl Sub<f64> for Time {
    type Output = Time;

    fn sub(self, days: f64) -> Self::Output {
        self + (-days)
    }
}

impl Sub<Time> for Time {
    type Output = f64;

    fn sub(self, other: Time) -> Self::Output {
        // Difference in days
        (self.whole - other.whole) + (self.tt_fraction - other.tt_fraction)
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.tt() == other.tt()
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.tt().partial_cmp(&other.tt())
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::new(dt)
    }
}
