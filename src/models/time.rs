//! Simulated clock and delivery deadlines.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::TimeParseError;

/// Minutes in one hour.
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// A time of day on the simulated clock, stored as minutes after midnight.
///
/// Parses `HH:MM`, `HH:MM:SS` and 12-hour `H:MM AM` / `H:MM PM` forms and
/// serializes as `HH:MM` (or `HH:MM:SS` when the value has seconds).
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Time;
///
/// let t: Time = "10:30 AM".parse().unwrap();
/// assert_eq!(t, Time::hm(10, 30));
/// assert_eq!(t.plus_minutes(45.0).to_string(), "11:15");
/// assert!(Time::hm(9, 5) < t);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Time(f64);

impl Time {
    /// Midnight, the start of the simulated day.
    pub const MIDNIGHT: Time = Time(0.0);

    /// Creates a time from minutes after midnight.
    pub fn from_minutes(minutes: f64) -> Self {
        Self(minutes)
    }

    /// Creates a time from an hour (0-23) and minute.
    pub fn hm(hour: u32, minute: u32) -> Self {
        Self(f64::from(hour) * MINUTES_PER_HOUR + f64::from(minute))
    }

    /// Minutes after midnight.
    pub fn minutes(self) -> f64 {
        self.0
    }

    /// Returns this time advanced by `minutes`.
    pub fn plus_minutes(self, minutes: f64) -> Self {
        Self(self.0 + minutes)
    }

    /// Minutes elapsed from `self` to `later` (negative if `later` is earlier).
    pub fn minutes_until(self, later: Time) -> f64 {
        later.0 - self.0
    }

    /// The later of two times.
    pub fn max(self, other: Time) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// The earlier of two times.
    pub fn min(self, other: Time) -> Self {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// Total ordering, usable as a sort key.
    pub fn total_cmp(&self, other: &Time) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = (self.0 * 60.0).round().max(0.0) as u32;
        match NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0) {
            Some(clock) if clock.second() == 0 => write!(f, "{}", clock.format("%H:%M")),
            Some(clock) => write!(f, "{}", clock.format("%H:%M:%S")),
            // Past the end of the day: no clock face to show.
            None => write!(f, "{:.0} min", self.0),
        }
    }
}

/// Accepted clock formats, tried in order. 12-hour forms appear with and
/// without a space before AM/PM.
const CLOCK_FORMATS: [&str; 6] = [
    "%H:%M",
    "%H:%M:%S",
    "%I:%M %p",
    "%I:%M:%S %p",
    "%I:%M%p",
    "%I:%M:%S%p",
];

impl FromStr for Time {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        CLOCK_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(&upper, format).ok())
            .map(Self::from)
            .ok_or_else(|| TimeParseError::new(trimmed))
    }
}

impl From<NaiveTime> for Time {
    fn from(clock: NaiveTime) -> Self {
        Self(f64::from(clock.num_seconds_from_midnight()) / 60.0)
    }
}

impl TryFrom<String> for Time {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Time> for String {
    fn from(value: Time) -> Self {
        value.to_string()
    }
}

/// The declared required-by time of a package.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Deadline, Time};
///
/// let eod: Deadline = "EOD".parse().unwrap();
/// assert!(eod.is_met_by(Time::hm(17, 0)));
///
/// let morning: Deadline = "9:00 AM".parse().unwrap();
/// assert!(!morning.is_met_by(Time::hm(9, 1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Deadline {
    /// Must be delivered no later than this time.
    At(Time),
    /// Anytime during the simulated day.
    #[default]
    EndOfDay,
}

impl Deadline {
    /// The deadline as a time, or `None` for end of day.
    pub fn time(self) -> Option<Time> {
        match self {
            Deadline::At(t) => Some(t),
            Deadline::EndOfDay => None,
        }
    }

    /// Returns `true` if delivering at `delivered` honors this deadline.
    pub fn is_met_by(self, delivered: Time) -> bool {
        match self {
            Deadline::At(t) => delivered <= t,
            Deadline::EndOfDay => true,
        }
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deadline::At(t) => write!(f, "{t}"),
            Deadline::EndOfDay => f.write_str("EOD"),
        }
    }
}

impl FromStr for Deadline {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("EOD") || trimmed.eq_ignore_ascii_case("end of day") {
            Ok(Deadline::EndOfDay)
        } else {
            trimmed.parse().map(Deadline::At)
        }
    }
}

impl TryFrom<String> for Deadline {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Deadline> for String {
    fn from(value: Deadline) -> Self {
        value.to_string()
    }
}
