// Telemetry domain models - backend payloads for readings and history
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Current aggregated conditions at one location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReading {
    pub location: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_ice_thickness: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_surface_temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_snow_accumulation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub safety_status: Option<String>,
}

/// One aggregation window of a location's history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    #[serde(default, deserialize_with = "lenient_window_end")]
    pub window_end_time: WindowEnd,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_ice_thickness: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_surface_temperature: Option<f64>,
}

/// End of an aggregation window as sent by the backend.
///
/// Offset-less date-times are kept naive and read in the display zone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WindowEnd {
    Instant(DateTime<Utc>),
    Naive(NaiveDateTime),
    #[default]
    Invalid,
}

impl WindowEnd {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return WindowEnd::Instant(instant.with_timezone(&Utc));
        }
        // Offsets without a colon, without seconds, or a bare `Z`.
        let zoned = match raw.strip_suffix(['Z', 'z']) {
            Some(head) => format!("{}+00:00", head),
            None => raw.to_string(),
        };
        for pattern in ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"] {
            if let Ok(instant) = DateTime::parse_from_str(&zoned, pattern) {
                return WindowEnd::Instant(instant.with_timezone(&Utc));
            }
        }
        for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
                return WindowEnd::Naive(naive);
            }
        }
        // Date-only forms are UTC midnight.
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return WindowEnd::Instant(Utc.from_utc_datetime(&midnight));
            }
        }
        WindowEnd::Invalid
    }

    pub fn from_epoch_millis(millis: i64) -> Self {
        match Utc.timestamp_millis_opt(millis).single() {
            Some(instant) => WindowEnd::Instant(instant),
            None => WindowEnd::Invalid,
        }
    }
}

/// Body of `GET /api/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestResponse {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<LocationReading>,
}

/// Body of `GET /api/status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub overall_status: Option<String>,
}

/// Body of `GET /api/history/{location}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<HistoryPoint>,
}

/// History fetched for one configured location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationHistory {
    pub location: String,
    pub points: Vec<HistoryPoint>,
}

impl LocationHistory {
    pub fn new(location: String, points: Vec<HistoryPoint>) -> Self {
        Self { location, points }
    }
}

/// Numeric coercion applied to every metric field.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    number.filter(|n| !n.is_nan())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    };
    Ok(text)
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    };
    Ok(flag)
}

fn lenient_window_end<'de, D>(deserializer: D) -> Result<WindowEnd, D::Error>
where
    D: Deserializer<'de>,
{
    let window_end = match Value::deserialize(deserializer)? {
        Value::String(s) => WindowEnd::parse(&s),
        Value::Number(n) => match n.as_i64() {
            Some(millis) => WindowEnd::from_epoch_millis(millis),
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| WindowEnd::from_epoch_millis(f.trunc() as i64))
                .unwrap_or(WindowEnd::Invalid),
        },
        _ => WindowEnd::Invalid,
    };
    Ok(window_end)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
