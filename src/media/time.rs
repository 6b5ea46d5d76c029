//! Time values accepted by delays, intervals and durations.
//!
//! A value is either a plain number of seconds (`0.5`, `42`), a time string
//! (`1.5 seconds`, `1 min 30 s`, `2h 3m`, `100 ms`) or a timer string
//! (`01:30`, `1:02:03.5`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScreenCapError;

/// A non-negative time value parsed from the formats above
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "TimeValue", into = "f64")]
pub struct TimeSpec(Duration);

impl TimeSpec {
    pub const ZERO: TimeSpec = TimeSpec(Duration::ZERO);

    pub fn from_secs_f64(secs: f64) -> Result<Self, ScreenCapError> {
        to_duration(secs, &secs.to_string()).map(Self)
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for TimeSpec {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl From<TimeSpec> for f64 {
    fn from(value: TimeSpec) -> Self {
        value.0.as_secs_f64()
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seconds", self.0.as_secs_f64())
    }
}

impl FromStr for TimeSpec {
    type Err = ScreenCapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs = parse_seconds(s)?;
        to_duration(secs, s).map(Self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Seconds(f64),
    Text(String),
}

impl TryFrom<TimeValue> for TimeSpec {
    type Error = String;

    fn try_from(value: TimeValue) -> Result<Self, Self::Error> {
        match value {
            TimeValue::Seconds(secs) => Self::from_secs_f64(secs),
            TimeValue::Text(text) => text.parse(),
        }
        .map_err(|e| e.to_string())
    }
}

fn invalid(input: &str) -> ScreenCapError {
    ScreenCapError::invalid(format!("Invalid time string '{}'.", input))
}

fn checked_seconds(secs: f64, input: &str) -> Result<f64, ScreenCapError> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(secs)
    } else {
        Err(invalid(input))
    }
}

fn to_duration(secs: f64, input: &str) -> Result<Duration, ScreenCapError> {
    let secs = checked_seconds(secs, input)?;
    Duration::try_from_secs_f64(secs).map_err(|_| invalid(input))
}

fn parse_seconds(input: &str) -> Result<f64, ScreenCapError> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    if let Ok(secs) = text.parse::<f64>() {
        return checked_seconds(secs, input);
    }
    if text.contains(':') {
        return parse_timer(text).ok_or_else(|| invalid(input));
    }
    parse_time_string(text).ok_or_else(|| invalid(input))
}

/// `[hh:]mm:ss[.fff]`
fn parse_timer(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };
    let hours: u64 = hours.trim().parse().ok()?;
    let minutes: u64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

fn unit_multiplier(unit: &str) -> Option<f64> {
    let multiplier = match unit {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "ms" | "millis" | "millisecond" | "milliseconds" => 0.001,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hour" | "hours" => 3600.0,
        "d" | "day" | "days" => 86400.0,
        _ => return None,
    };
    Some(multiplier)
}

/// Sequence of `<number><unit>` pairs; whitespace is insignificant
fn parse_time_string(text: &str) -> Option<f64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    let mut chars = compact.chars().peekable();
    let mut total = 0.0;
    let mut seen_any = false;

    while chars.peek().is_some() {
        let mut number = String::new();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_digit() || *c == '.') {
            number.push(c);
            chars.next();
        }
        let mut unit = String::new();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_alphabetic()) {
            unit.push(c);
            chars.next();
        }
        if number.is_empty() {
            return None;
        }
        let value: f64 = number.parse().ok()?;
        total += value * unit_multiplier(&unit)?;
        seen_any = true;
    }

    seen_any.then_some(total)
}
