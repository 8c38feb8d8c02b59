// src/poll/payload.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::{SampleColumns, WireTimestamp};
use crate::error::ValidationError;

/// Body of `GET /screenshot-data/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotResponse {
    pub data: RawSamplePayload,
}

/// Parallel arrays exactly as the endpoint sends them. Nothing is checked
/// here; lengths are validated when the payload becomes a [`SampleColumns`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSamplePayload {
    pub time: Vec<WireTimestamp>,
    pub luminance: Vec<f64>,
    pub saturation: Vec<f64>,
    pub chroma: Vec<f64>,
    pub hue: Vec<f64>,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    pub urls: Vec<String>,
    #[serde(alias = "ids", skip_serializing_if = "Option::is_none")]
    pub uuids: Option<Vec<String>>,
}

impl RawSamplePayload {
    /// Number of samples as far as change detection is concerned: the
    /// length of the `time` array.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Parse timestamps and fill in missing ids. Samples without ids get a
    /// fresh v4 UUID each.
    pub fn into_columns(self) -> Result<SampleColumns, ValidationError> {
        let timestamps = self
            .time
            .iter()
            .enumerate()
            .map(|(i, t)| t.parse(i))
            .collect::<Result<Vec<_>, _>>()?;

        let ids = self
            .uuids
            .unwrap_or_else(|| (0..timestamps.len()).map(|_| Uuid::new_v4().to_string()).collect());

        let columns = SampleColumns {
            timestamps,
            luminance: self.luminance,
            saturation: self.saturation,
            chroma: self.chroma,
            hue: self.hue,
            channel_a: self.a,
            channel_b: self.b,
            image_urls: self.urls,
            ids,
        };
        columns.validate()?;
        Ok(columns)
    }
}

impl From<&SampleColumns> for RawSamplePayload {
    fn from(columns: &SampleColumns) -> Self {
        Self {
            time: columns.timestamps.iter().copied().map(WireTimestamp::from).collect(),
            luminance: columns.luminance.clone(),
            saturation: columns.saturation.clone(),
            chroma: columns.chroma.clone(),
            hue: columns.hue.clone(),
            a: columns.channel_a.clone(),
            b: columns.channel_b.clone(),
            urls: columns.image_urls.clone(),
            uuids: Some(columns.ids.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "data": {
            "time": ["2024-03-01T12:00:00Z", 1709294401000],
            "luminance": [50.5, 51.0],
            "saturation": [0.2, 0.3],
            "chroma": [12.0, 13.5],
            "hue": [180.0, 181.0],
            "a": [-3.0, -2.5],
            "b": [4.0, 4.5],
            "urls": ["/static/shots/0.jpg", "/static/shots/1.jpg"]
        }
    }"#;

    #[test]
    fn test_decodes_endpoint_body() {
        let response: ScreenshotResponse = serde_json::from_str(BODY).unwrap();
        let payload = response.data;
        assert_eq!(payload.len(), 2);
        assert!(payload.uuids.is_none());

        let columns = payload.into_columns().unwrap();
        assert_eq!(columns.chroma, vec![12.0, 13.5]);
        assert_eq!(columns.channel_a, vec![-3.0, -2.5]);
        assert_eq!(columns.timestamps[1].timestamp(), 1_709_294_401);
    }

    #[test]
    fn test_missing_ids_are_generated_and_unique() {
        let response: ScreenshotResponse = serde_json::from_str(BODY).unwrap();
        let columns = response.data.into_columns().unwrap();
        assert_eq!(columns.ids.len(), 2);
        assert_ne!(columns.ids[0], columns.ids[1]);
    }

    #[test]
    fn test_ids_alias_is_accepted() {
        let payload: RawSamplePayload = serde_json::from_str(
            r#"{"time": [0], "luminance": [1], "saturation": [1], "chroma": [1], "hue": [1],
                "a": [1], "b": [1], "urls": ["u"], "ids": ["shot-0"]}"#,
        )
        .unwrap();
        assert_eq!(payload.into_columns().unwrap().ids, vec!["shot-0".to_string()]);
    }

    #[test]
    fn test_ragged_payload_is_rejected() {
        let mut payload: RawSamplePayload = serde_json::from_str::<ScreenshotResponse>(BODY).unwrap().data;
        payload.urls.pop();
        assert!(matches!(
            payload.into_columns(),
            Err(ValidationError::LengthMismatch { column: "urls", expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let payload: RawSamplePayload = serde_json::from_str(r#"{"time": []}"#).unwrap();
        assert!(payload.is_empty());
        assert!(payload.into_columns().unwrap().is_empty());
    }
}
