//! GPS time conversion and minute-trend alignment.
//!
//! NDS servers index data by GPS seconds. This module converts wall-clock
//! dates to GPS (including leap seconds), parses the loose epoch formats
//! users type on the command line, and snaps intervals to the 60-second
//! grid that minute trends are stored on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimeError;

/// Unix timestamp of the GPS epoch, 1980-01-06T00:00:00Z.
pub const GPS_EPOCH_UNIX: i64 = 315_964_800;

/// Minute-trend sample spacing in seconds.
pub const MINUTE_TREND_STRIDE: i64 = 60;

/// Unix timestamps at which a leap second had been inserted (post-1980).
const LEAP_SECONDS_UNIX: [i64; 18] = [
    362_793_600,   // 1981-07-01
    394_329_600,   // 1982-07-01
    425_865_600,   // 1983-07-01
    489_024_000,   // 1985-07-01
    567_993_600,   // 1988-01-01
    631_152_000,   // 1990-01-01
    662_688_000,   // 1991-01-01
    709_948_800,   // 1992-07-01
    741_484_800,   // 1993-07-01
    773_020_800,   // 1994-07-01
    820_454_400,   // 1996-01-01
    867_715_200,   // 1997-07-01
    915_148_800,   // 1999-01-01
    1_136_073_600, // 2006-01-01
    1_230_768_000, // 2009-01-01
    1_341_100_800, // 2012-07-01
    1_435_708_800, // 2015-07-01
    1_483_228_800, // 2017-01-01
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%B %d %Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%b %d %Y", "%B %d %Y", "%d %b %Y", "%Y/%m/%d"];

/// Convert a UTC instant to integer GPS seconds.
#[must_use]
pub fn to_gps(time: DateTime<Utc>) -> i64 {
    let unix = time.timestamp();
    let leaps = LEAP_SECONDS_UNIX.iter().filter(|&&t| t <= unix).count() as i64;
    unix - GPS_EPOCH_UNIX + leaps
}

/// Current GPS time in seconds.
#[must_use]
pub fn gps_now() -> i64 {
    to_gps(Utc::now())
}

/// Parse a time string to GPS seconds.
///
/// Accepts `now`, a GPS number, RFC 3339, and a handful of date formats
/// (`2015-01-01`, `Jan 1 2015`, `2015-01-01 12:00:00`). Dates without a
/// zone are taken as UTC.
///
/// # Errors
///
/// Returns [`TimeError::Unparseable`] if no format matches,
/// [`TimeError::OutOfRange`] for numbers beyond `i64` and
/// [`TimeError::BeforeGpsEpoch`] for dates before 1980-01-06.
pub fn parse_gps(input: &str, now: i64) -> Result<i64, TimeError> {
    let text = input.trim();
    if text.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    if let Ok(gps) = text.parse::<i64>() {
        return Ok(gps);
    }
    if let Ok(gps) = text.parse::<f64>() {
        if gps.is_finite() {
            let gps = gps.floor();
            // i64::MAX as f64 rounds up to 2^63
            if gps < i64::MIN as f64 || gps >= i64::MAX as f64 {
                return Err(TimeError::OutOfRange(input.to_string()));
            }
            return Ok(gps as i64);
        }
    }

    let utc = parse_datetime(text).ok_or_else(|| TimeError::Unparseable(input.to_string()))?;
    if utc.timestamp() < GPS_EPOCH_UNIX {
        return Err(TimeError::BeforeGpsEpoch(input.to_string()));
    }
    Ok(to_gps(utc))
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// The time a query is about.
///
/// Only the start matters when deciding which servers hold the data, so an
/// [`Epoch::Interval`] is reduced to its start.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Epoch {
    /// The current time
    #[default]
    Now,
    /// GPS seconds
    Gps(i64),
    /// Free-form text: `now`, a GPS number, or a date
    Text(String),
    /// `(start, end)` in GPS seconds
    Interval(i64, i64),
}

impl Epoch {
    /// GPS start of this epoch, given the current GPS time.
    ///
    /// # Errors
    ///
    /// Fails when text cannot be parsed or an interval is inverted.
    pub fn start_gps(&self, now: i64) -> Result<i64, TimeError> {
        match self {
            Epoch::Now => Ok(now),
            Epoch::Gps(gps) => Ok(*gps),
            Epoch::Text(text) => parse_gps(text, now),
            Epoch::Interval(start, end) if end < start => Err(TimeError::InvertedInterval {
                start: *start,
                end: *end,
            }),
            Epoch::Interval(start, _) => Ok(*start),
        }
    }
}

impl From<&str> for Epoch {
    fn from(text: &str) -> Self {
        Epoch::Text(text.to_string())
    }
}

impl From<i64> for Epoch {
    fn from(gps: i64) -> Self {
        Epoch::Gps(gps)
    }
}

impl From<(i64, i64)> for Epoch {
    fn from((start, end): (i64, i64)) -> Self {
        Epoch::Interval(start, end)
    }
}

/// Expand `[start, end)` outward onto the minute-trend grid.
///
/// `start` is floored to a multiple of 60; `end` is ceiled to a multiple of
/// 60 unless it is already aligned. The GPS epoch is itself a multiple of 60
/// seconds after the Unix epoch, so the grid is the same in either frame.
///
/// # Errors
///
/// [`TimeError::Unalignable`] if either bound would leave the `i64` range.
pub fn align_minute_trend(start: i64, end: i64) -> Result<(i64, i64), TimeError> {
    let unalignable = || TimeError::Unalignable { start, end };
    let aligned_start = start
        .checked_sub(start.rem_euclid(MINUTE_TREND_STRIDE))
        .ok_or_else(unalignable)?;
    let offset = end.rem_euclid(MINUTE_TREND_STRIDE);
    let aligned_end = if offset == 0 {
        end
    } else {
        end.checked_add(MINUTE_TREND_STRIDE - offset)
            .ok_or_else(unalignable)?
    };
    Ok((aligned_start, aligned_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_minute_trend() {
        let cases = [
            ((0, 60), (0, 60)),
            ((1, 60), (0, 60)),
            ((0, 61), (0, 120)),
            ((59, 61), (0, 120)),
            ((1167264018, 1198800018), (1167264000, 1198800060)),
        ];
        for ((start, end), expected) in cases {
            assert_eq!(align_minute_trend(start, end).unwrap(), expected, "({start}, {end})");
        }
    }

    #[test]
    fn test_align_minute_trend_negative() {
        assert_eq!(align_minute_trend(-1, -1).unwrap(), (-60, 0));
    }

    #[test]
    fn test_align_minute_trend_at_i64_bounds() {
        assert_eq!(
            align_minute_trend(0, i64::MAX),
            Err(TimeError::Unalignable { start: 0, end: i64::MAX })
        );
        assert_eq!(
            align_minute_trend(i64::MIN, 0),
            Err(TimeError::Unalignable { start: i64::MIN, end: 0 })
        );

        // last grid points inside the range still align
        let top = i64::MAX - i64::MAX.rem_euclid(60);
        assert_eq!(align_minute_trend(0, top).unwrap(), (0, top));
        let bottom = i64::MIN + (60 - i64::MIN.rem_euclid(60));
        assert_eq!(align_minute_trend(bottom, 0).unwrap(), (bottom, 0));
        assert_eq!(align_minute_trend(0, i64::MIN + 1).unwrap(), (0, bottom));
    }

    #[test]
    fn test_gps_epoch_is_on_minute_grid() {
        assert_eq!(GPS_EPOCH_UNIX % MINUTE_TREND_STRIDE, 0);
    }

    #[test]
    fn test_to_gps_known_values() {
        let epoch = Utc.with_ymd_and_hms(1980, 1, 6, 0, 0, 0).unwrap();
        assert_eq!(to_gps(epoch), 0);

        let jan2015 = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_gps(jan2015), 1104105616);

        let jan2017 = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_gps(jan2017), 1167264018);
    }

    #[test]
    fn test_parse_gps_formats() {
        let now = 1_300_000_000;
        assert_eq!(parse_gps("now", now).unwrap(), now);
        assert_eq!(parse_gps("NOW", now).unwrap(), now);
        assert_eq!(parse_gps("1126259462", now).unwrap(), 1126259462);
        assert_eq!(parse_gps("1126259462.4", now).unwrap(), 1126259462);
        assert_eq!(parse_gps("Jan 1 2015", now).unwrap(), 1104105616);
        assert_eq!(parse_gps("2015-01-01", now).unwrap(), 1104105616);
        assert_eq!(parse_gps("2015-01-01T00:00:00Z", now).unwrap(), 1104105616);
    }

    #[test]
    fn test_parse_gps_errors() {
        assert!(matches!(
            parse_gps("not a date", 0),
            Err(TimeError::Unparseable(_))
        ));
        assert!(matches!(
            parse_gps("1970-01-01", 0),
            Err(TimeError::BeforeGpsEpoch(_))
        ));
        assert_eq!(parse_gps("1e30", 0), Err(TimeError::OutOfRange("1e30".to_string())));
        assert_eq!(parse_gps("-1e30", 0), Err(TimeError::OutOfRange("-1e30".to_string())));
        assert_eq!(parse_gps("1e18", 0).unwrap(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_epoch_start() {
        let now = 1_300_000_000;
        assert_eq!(Epoch::Now.start_gps(now).unwrap(), now);
        assert_eq!(Epoch::from("now").start_gps(now).unwrap(), now);
        assert_eq!(Epoch::from((100, 200)).start_gps(now).unwrap(), 100);
        assert!(Epoch::Interval(200, 100).start_gps(now).is_err());
    }
}
