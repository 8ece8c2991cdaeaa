// Display formatting rules for cards, badges and chart labels
use chrono::{DateTime, FixedOffset, NaiveTime, Timelike, Utc};

use super::telemetry::WindowEnd;

/// Shown in place of a metric that has no value.
pub const PLACEHOLDER: &str = "--";

/// Label used for a history point whose time could not be read.
pub const INVALID_TIME_LABEL: &str = "Invalid Date";

/// Format a metric with one decimal place, or the placeholder when missing.
///
/// Exact ties round away from zero (`12.25` -> `"12.3"`). Values like `12.35`
/// are stored slightly below the tie and round down.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => fixed_one_decimal(v),
        _ => PLACEHOLDER.to_string(),
    }
}

fn fixed_one_decimal(value: f64) -> String {
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }

    // Negative zero prints unsigned.
    let value = if value == 0.0 { 0.0 } else { value };

    // Fixed notation stops at 1e21; larger magnitudes print in exponent form.
    if value.abs() >= 1e21 {
        return format!("{:e}", value).replacen('e', "e+", 1);
    }

    // A tie at the second decimal is only representable on quarter values,
    // where the integer part is exact.
    let magnitude = value.abs();
    if (magnitude * 4.0).fract() == 0.0 && (magnitude * 2.0).fract() != 0.0 {
        let digit = if magnitude.fract() == 0.25 { 3 } else { 8 };
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}{:.0}.{}", sign, magnitude.trunc(), digit);
    }

    format!("{:.1}", value)
}

/// Lowercase and keep only `a-z`.
pub fn alpha_key(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

/// CSS class for a per-location safety status.
pub fn status_class(status: &str) -> String {
    alpha_key(status)
}

/// Zone used for every wall-clock string on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayZone {
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| m.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .map(DisplayZone::Fixed)
            .unwrap_or(DisplayZone::Local)
    }

    pub fn time_of_day(&self, instant: DateTime<Utc>) -> NaiveTime {
        match self {
            DisplayZone::Local => instant.with_timezone(&chrono::Local).time(),
            DisplayZone::Fixed(offset) => instant.with_timezone(offset).time(),
        }
    }

    /// `hh:mm:ss a.m.` for the last-update field.
    pub fn clock_with_seconds(&self, instant: DateTime<Utc>) -> String {
        let time = self.time_of_day(instant);
        format!("{} {}", time.format("%I:%M:%S"), meridiem(&time))
    }

    /// `hh:mm a.m.` for chart axis labels.
    pub fn axis_label(&self, window_end: &WindowEnd) -> String {
        let time = match window_end {
            WindowEnd::Instant(instant) => self.time_of_day(*instant),
            WindowEnd::Naive(naive) => naive.time(),
            WindowEnd::Invalid => return INVALID_TIME_LABEL.to_string(),
        };
        format!("{} {}", time.format("%I:%M"), meridiem(&time))
    }
}

fn meridiem(time: &NaiveTime) -> &'static str {
    if time.hour() < 12 { "a.m." } else { "p.m." }
}
