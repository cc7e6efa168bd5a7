//! Epochs for precession, nutation and sidereal time
//!
//! An [`Epoch`] is a single Julian day. The same number serves as the dynamical
//! time argument of the precession and nutation series and as universal time for
//! sidereal time; the sub-minute difference between the two (ΔT) is ignored.
//!
//! Calendar conversions use the Gregorian calendar from 1582-10-15 onward and
//! the Julian calendar before it.

use crate::constants::{B1950, DAY_S, GREGORIAN_START, J2000, JULIAN_CENTURY, JULIAN_YEAR, MJD_OFFSET, TROPICAL_YEAR};
use crate::errors::{check_closed, check_finite, FrameError, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

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

/// Instant identifying an equinox and equator of reference
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Epoch {
    jd: f64,
}

impl Default for Epoch {
    fn default() -> Self {
        Epoch::J2000
    }
}

impl Epoch {
    /// J2000.0, 2000-01-01 12:00
    pub const J2000: Epoch = Epoch { jd: J2000 };
    /// B1950.0
    pub const B1950: Epoch = Epoch { jd: B1950 };

    /// Epoch at Julian day `jd`
    pub fn from_jd(jd: f64) -> Result<Self> {
        Ok(Self {
            jd: check_finite("jd", jd)?,
        })
    }

    /// Epoch from a calendar date and time of day
    pub fn from_calendar(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    ) -> Result<Self> {
        check_closed("month", month as f64, 1.0, 12.0, "[1, 12]")?;
        check_closed("day", day as f64, 1.0, 31.0, "[1, 31]")?;
        check_closed("hour", hour as f64, 0.0, 23.0, "[0, 23]")?;
        check_closed("minute", minute as f64, 0.0, 59.0, "[0, 59]")?;
        check_finite("second", second)?;
        if !(0.0..61.0).contains(&second) {
            return Err(FrameError::RangeValidation {
                field: "second",
                value: second,
                range: "[0, 61)",
            });
        }
        let day_fraction = (hour as f64 + minute as f64 / 60.0 + second / 3600.0) / 24.0;
        let jdn = julian_day(year, month, day);
        Self::from_jd(jdn as f64 - 0.5 + day_fraction)
    }

    /// Epoch of a UTC timestamp
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let jdn = julian_day(dt.year(), dt.month(), dt.day());
        let seconds = dt.num_seconds_from_midnight() as f64 + dt.nanosecond() as f64 * 1e-9;
        Self {
            jd: jdn as f64 - 0.5 + seconds / DAY_S,
        }
    }

    /// Julian epoch, e.g. `julian_epoch(2015.5)` for J2015.5
    pub fn julian_epoch(year: f64) -> Result<Self> {
        check_finite("year", year)?;
        Self::from_jd(J2000 + (year - 2000.0) * JULIAN_YEAR)
    }

    /// Besselian epoch, e.g. `besselian_epoch(1950.0)` for B1950.0
    pub fn besselian_epoch(year: f64) -> Result<Self> {
        check_finite("year", year)?;
        Self::from_jd(B1950 + (year - 1950.0) * TROPICAL_YEAR)
    }

    pub fn jd(&self) -> f64 {
        self.jd
    }

    /// Modified Julian day
    pub fn mjd(&self) -> f64 {
        self.jd - MJD_OFFSET
    }

    /// Julian centuries since J2000.0
    pub fn julian_centuries(&self) -> f64 {
        (self.jd - J2000) / JULIAN_CENTURY
    }

    pub fn julian_year(&self) -> f64 {
        2000.0 + (self.jd - J2000) / JULIAN_YEAR
    }

    pub fn besselian_year(&self) -> f64 {
        1950.0 + (self.jd - B1950) / TROPICAL_YEAR
    }

    pub fn is_j2000(&self) -> bool {
        self.jd == J2000
    }

    /// Shift by a number of days
    pub fn add_days(&self, days: f64) -> Result<Self> {
        Self::from_jd(self.jd + days)
    }

    /// Calendar date and time of day, to the nearest millisecond
    ///
    /// A Julian day near the present resolves only to about 40 µs, so finer
    /// digits would be noise.
    pub fn calendar(&self) -> CalendarTuple {
        const MILLIS_PER_DAY: i64 = 86_400_000;
        let jd_plus_half = self.jd + 0.5;
        let mut z = jd_plus_half.floor();
        let mut millis = ((jd_plus_half - z) * DAY_S * 1e3).round() as i64;
        // Rounding can land exactly on the next midnight
        if millis >= MILLIS_PER_DAY {
            z += 1.0;
            millis -= MILLIS_PER_DAY;
        }

        let (year, month, day) = julian_day_to_calendar_date(z as i32);

        let hour = (millis / 3_600_000) as u32;
        let minute = ((millis / 60_000) % 60) as u32;
        let second = (millis % 60_000) as f64 / 1e3;

        CalendarTuple {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// UTC timestamp of this epoch
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        let cal = self.calendar();
        let whole = cal.second.floor();
        let nanos = ((cal.second - whole) * 1e9).round().min(999_999_999.0) as u32;
        NaiveDate::from_ymd_opt(cal.year, cal.month, cal.day)
            .and_then(|date| date.and_hms_nano_opt(cal.hour, cal.minute, whole as u32, nanos))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or(FrameError::RangeValidation {
                field: "epoch",
                value: self.jd,
                range: "representable calendar dates",
            })
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_j2000() {
            return write!(f, "J2000.0");
        }
        let cal = self.calendar();
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:06.3} (JD {:.6})",
            cal.year, cal.month, cal.day, cal.hour, cal.minute, cal.second, self.jd
        )
    }
}

impl FromStr for Epoch {
    type Err = FrameError;

    /// Accepts `J2000`, `B1950`, `J<year>`, `B<year>`, `JD<number>` and RFC 3339 timestamps
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || FrameError::TypeValidation {
            field: "epoch",
            message: format!("cannot parse `{s}` as an epoch"),
        };
        if let Some(rest) = text.strip_prefix("JD") {
            let jd = rest.trim().parse::<f64>().map_err(|_| invalid())?;
            return Self::from_jd(jd);
        }
        if let Some(rest) = text.strip_prefix('J') {
            let year = rest.parse::<f64>().map_err(|_| invalid())?;
            return Self::julian_epoch(year);
        }
        if let Some(rest) = text.strip_prefix('B') {
            let year = rest.parse::<f64>().map_err(|_| invalid())?;
            return Self::besselian_epoch(year);
        }
        DateTime::parse_from_rfc3339(text)
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .map_err(|_| invalid())
    }
}

impl From<DateTime<Utc>> for Epoch {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Normalize a month value to the range 1-12, adjusting the year as needed
fn normalize_month(year: i32, month: u32) -> (i32, u32) {
    if (1..=12).contains(&month) {
        return (year, month);
    }
    let month_0 = month as i32 - 1;
    (year + month_0.div_euclid(12), (month_0.rem_euclid(12) + 1) as u32)
}

/// Julian day number (at noon) of a calendar date
///
/// Explanatory Supplement to the Astronomical Almanac 15.11.
pub fn julian_day(year: i32, month: u32, day: u32) -> i32 {
    let (year, month) = normalize_month(year, month);

    let janfeb = month <= 2;
    let g = year + 4716 - if janfeb { 1 } else { 0 };
    let f = (month + 9) % 12;
    let e = 1461 * g / 4 + day as i32 - 1402;
    let mut j = e + (153 * f as i32 + 2) / 5;

    if j >= GREGORIAN_START {
        j += 38 - (g + 184) / 100 * 3 / 4;
    }
    j
}

/// Calendar date of a Julian day number
///
/// Explanatory Supplement to the Astronomical Almanac 15.11.
pub fn julian_day_to_calendar_date(jd: i32) -> (i32, u32, u32) {
    let mut f = jd + 1401;
    if jd >= GREGORIAN_START {
        f += (4 * jd + 274277) / 146097 * 3 / 4 - 38;
    }

    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;

    let day = (h % 153) / 5 + 1;
    let month = ((h / 153) + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_j2000() {
        let e = Epoch::from_calendar(2000, 1, 1, 12, 0, 0.0).unwrap();
        assert_eq!(e, Epoch::J2000);
        assert!(e.is_j2000());
        assert_eq!(e.julian_centuries(), 0.0);
        assert_eq!(Epoch::default(), Epoch::J2000);
    }

    #[rstest]
    #[case(1957, 10, 4, 19, 26, 24.0, 2436116.31)]
    #[case(1987, 4, 10, 0, 0, 0.0, 2446895.5)]
    #[case(1987, 4, 10, 19, 21, 0.0, 2446896.30625)]
    #[case(333, 1, 27, 12, 0, 0.0, 1842713.0)]
    #[case(1582, 10, 15, 0, 0, 0.0, 2299160.5)]
    #[case(1582, 10, 4, 0, 0, 0.0, 2299159.5)]
    fn test_calendar_to_jd(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] second: f64,
        #[case] expected: f64,
    ) {
        let e = Epoch::from_calendar(year, month, day, hour, minute, second).unwrap();
        assert_relative_eq!(e.jd(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_calendar_round_trip() {
        let e = Epoch::from_jd(2446896.30625).unwrap();
        let cal = e.calendar();
        assert_eq!((cal.year, cal.month, cal.day, cal.hour, cal.minute), (1987, 4, 10, 19, 21));
        assert_eq!(cal.second, 0.0);
        assert_eq!(e.to_string(), "1987-04-10 19:21:00.000 (JD 2446896.306250)");
        assert_eq!(
            e.to_datetime().unwrap(),
            Utc.with_ymd_and_hms(1987, 4, 10, 19, 21, 0).unwrap()
        );
    }

    #[test]
    fn test_calendar_carries_into_next_day() {
        // 0.2 ms before midnight rounds up to the next date
        let e = Epoch::from_jd(2451545.5 - 0.2e-3 / DAY_S).unwrap();
        let cal = e.calendar();
        assert_eq!((cal.year, cal.month, cal.day, cal.hour, cal.minute), (2000, 1, 2, 0, 0));
        assert_eq!(cal.second, 0.0);
    }

    #[test]
    fn test_named_epochs() {
        assert_eq!("J2000".parse::<Epoch>().unwrap(), Epoch::J2000);
        assert_eq!("B1950".parse::<Epoch>().unwrap(), Epoch::B1950);
        let j = "J2015.5".parse::<Epoch>().unwrap();
        assert_relative_eq!(j.jd(), 2457206.375, epsilon = 1e-9);
        assert_relative_eq!(j.julian_year(), 2015.5, epsilon = 1e-12);
        let b = Epoch::besselian_epoch(1950.0).unwrap();
        assert_relative_eq!(b.besselian_year(), 1950.0, epsilon = 1e-12);
        let jd = "JD2446895.5".parse::<Epoch>().unwrap();
        assert_eq!(jd.jd(), 2446895.5);
    }

    #[test]
    fn test_parse_rfc3339() {
        let e = "1987-04-10T19:21:00Z".parse::<Epoch>().unwrap();
        assert_relative_eq!(e.jd(), 2446896.30625, epsilon = 1e-8);
        assert!(matches!(
            "yesterday".parse::<Epoch>(),
            Err(FrameError::TypeValidation { field: "epoch", .. })
        ));
    }

    #[test]
    fn test_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap();
        let e = Epoch::from(dt);
        let back = e.to_datetime().unwrap();
        assert!((back - dt).num_milliseconds().abs() <= 1);
        assert_relative_eq!(e.mjd(), 60389.12916666, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        assert!(matches!(
            Epoch::from_calendar(2000, 13, 1, 0, 0, 0.0),
            Err(FrameError::RangeValidation { field: "month", .. })
        ));
        assert!(Epoch::from_jd(f64::NAN).is_err());
    }
}
