// src/chart/sample.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One time-stamped color-metric observation plus its thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub luminance: f64,
    pub saturation: f64,
    pub chroma: f64,
    pub hue: f64,
    pub channel_a: f64,
    pub channel_b: f64,
    pub image_url: String,
    pub id: String,
}

/// A `time` entry as the endpoint sends it: epoch milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(f64),
    Text(String),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl WireTimestamp {
    pub fn parse(&self, index: usize) -> Result<DateTime<Utc>, ValidationError> {
        let invalid = || ValidationError::Timestamp {
            index,
            value: self.to_string(),
        };

        match self {
            WireTimestamp::Millis(ms) => millis_to_utc(*ms).ok_or_else(invalid),
            WireTimestamp::Text(text) => {
                let text = text.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Ok(dt.with_timezone(&Utc));
                }
                // no offset means UTC
                for format in NAIVE_FORMATS {
                    if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                        return Ok(naive.and_utc());
                    }
                }
                text.parse::<f64>()
                    .ok()
                    .and_then(millis_to_utc)
                    .ok_or_else(invalid)
            }
        }
    }
}

impl std::fmt::Display for WireTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireTimestamp::Millis(ms) => write!(f, "{}", ms),
            WireTimestamp::Text(text) => f.write_str(text),
        }
    }
}

impl From<DateTime<Utc>> for WireTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        WireTimestamp::Millis(dt.timestamp_millis() as f64)
    }
}

fn millis_to_utc(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms.round() as i64)
}

/// Seconds since the epoch, the X coordinate the chart plots against.
pub fn epoch_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / 1000.0
}
