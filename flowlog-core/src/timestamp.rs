//! Epoch-seconds → milliseconds conversion and human-readable rendering.

use crate::error::FlowLogError;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// `YYYY-MM-DD HH:MM:SS.ffffff`
pub const HUMAN_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Time zone used when rendering human-readable timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneSetting {
    #[default]
    Local,
    Utc,
}

impl TimeZoneSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeZoneSetting::Local => "local",
            TimeZoneSetting::Utc => "utc",
        }
    }
}

/// Floor epoch seconds to whole milliseconds.
pub fn to_millis(seconds: f64) -> Result<i64, FlowLogError> {
    if !seconds.is_finite() {
        return Err(FlowLogError::MalformedTimestamp(format!(
            "{seconds} is not a finite number of seconds"
        )));
    }
    let millis = (seconds * 1000.0).floor();
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if millis < i64::MIN as f64 || millis >= i64::MAX as f64 {
        return Err(FlowLogError::MalformedTimestamp(format!(
            "{seconds} seconds overflows a millisecond timestamp"
        )));
    }
    Ok(millis as i64)
}

/// Render a millisecond timestamp in the given zone.
pub fn format_millis(millis: i64, tz: TimeZoneSetting) -> Result<String, FlowLogError> {
    match tz {
        TimeZoneSetting::Local => format_millis_in(millis, &Local),
        TimeZoneSetting::Utc => format_millis_in(millis, &Utc),
    }
}

/// Render a millisecond timestamp in an arbitrary chrono zone.
pub fn format_millis_in<Tz>(millis: i64, tz: &Tz) -> Result<String, FlowLogError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        FlowLogError::MalformedTimestamp(format!("{millis} ms is outside the representable range"))
    })?;
    Ok(utc.with_timezone(tz).format(HUMAN_FORMAT).to_string())
}
