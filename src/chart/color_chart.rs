// src/chart/color_chart.rs
use chrono::{DateTime, Utc};

use super::bridge::RenderBridge;
use super::buffer::{DataBuffer, SampleColumns};
use super::channel::SelectedChannel;
use super::viewport::Viewport;
use crate::error::ValidationError;
use crate::poll::payload::RawSamplePayload;

/// Backgrounds darker than this (by red component) are drawn transparent.
const OPAQUE_RED_THRESHOLD: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    pub rgb: (u8, u8, u8),
    pub opaque: bool,
}

impl Background {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            rgb: (r, g, b),
            opaque: r >= OPAQUE_RED_THRESHOLD,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::from_rgb(17, 17, 17)
    }
}

/// Result of offering a polled payload to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Replaced(usize),
    /// Same length as what we already show, so it was ignored.
    Unchanged(usize),
}

/// The chart widget: one buffer, one channel selection, one render bridge.
#[derive(Debug)]
pub struct ColorChart<R: RenderBridge> {
    buffer: DataBuffer,
    channel: SelectedChannel,
    bridge: R,
    background: Background,
    viewport: Viewport,
}

impl<R: RenderBridge> ColorChart<R> {
    pub fn new(bridge: R) -> Self {
        Self::with_channel(bridge, SelectedChannel::default())
    }

    pub fn with_channel(mut bridge: R, channel: SelectedChannel) -> Self {
        bridge.set_y_axis_label(channel.label());
        Self {
            buffer: DataBuffer::new(),
            channel,
            bridge,
            background: Background::default(),
            viewport: Viewport::new(),
        }
    }

    pub fn buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    pub fn channel(&self) -> SelectedChannel {
        self.channel
    }

    pub fn bridge(&self) -> &R {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut R {
        &mut self.bridge
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> (&mut Viewport, usize) {
        let len = self.buffer.len();
        (&mut self.viewport, len)
    }

    /// The Y column currently on screen.
    pub fn plotted(&self) -> &[f64] {
        self.buffer.select_channel(self.channel)
    }

    /// Load data directly, skipping the network.
    #[allow(clippy::too_many_arguments)]
    pub fn set_data(
        &mut self,
        timestamps: Vec<DateTime<Utc>>,
        luminance: Vec<f64>,
        saturation: Vec<f64>,
        chroma: Vec<f64>,
        hue: Vec<f64>,
        channel_a: Vec<f64>,
        channel_b: Vec<f64>,
        image_urls: Vec<String>,
        ids: Vec<String>,
    ) -> Result<(), ValidationError> {
        self.replace(SampleColumns {
            timestamps,
            luminance,
            saturation,
            chroma,
            hue,
            channel_a,
            channel_b,
            image_urls,
            ids,
        })?;
        Ok(())
    }

    /// Validate and swap in `columns`, then tell the renderer.
    pub fn replace(&mut self, columns: SampleColumns) -> Result<usize, ValidationError> {
        let len = self.buffer.replace(columns)?;
        self.viewport.clamp(len);
        self.bridge.notify_data_changed();
        Ok(len)
    }

    /// Only replaces when the sample count moved. Payloads of the same length
    /// are dropped even if their values differ.
    pub fn apply_polled(&mut self, payload: RawSamplePayload) -> Result<ApplyOutcome, ValidationError> {
        let current = self.buffer.len();
        if payload.len() == current {
            return Ok(ApplyOutcome::Unchanged(current));
        }
        let columns = payload.into_columns()?;
        let len = self.replace(columns)?;
        Ok(ApplyOutcome::Replaced(len))
    }

    pub fn select_channel(&mut self, channel: SelectedChannel) -> &[f64] {
        self.channel = channel;
        self.bridge.set_y_axis_label(channel.label());
        self.bridge.notify_data_changed();
        self.buffer.select_channel(channel)
    }

    pub fn set_background_color(&mut self, r: u8, g: u8, b: u8) {
        self.background = Background::from_rgb(r, g, b);
        self.bridge.notify_data_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Default)]
    struct RecordingBridge {
        notifications: usize,
        labels: Vec<String>,
    }

    impl RenderBridge for RecordingBridge {
        fn notify_data_changed(&mut self) {
            self.notifications += 1;
        }

        fn set_y_axis_label(&mut self, label: &str) {
            self.labels.push(label.to_string());
        }
    }

    fn times(n: usize) -> Vec<DateTime<Utc>> {
        (0..n).map(|i| Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap()).collect()
    }

    fn strings(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn two_sample_chart() -> ColorChart<RecordingBridge> {
        let mut chart = ColorChart::new(RecordingBridge::default());
        chart
            .set_data(
                times(2),
                vec![1.0, 2.0],
                vec![3.0, 4.0],
                vec![5.0, 6.0],
                vec![7.0, 8.0],
                vec![9.0, 10.0],
                vec![11.0, 12.0],
                strings("/img/", 2),
                strings("uuid-", 2),
            )
            .unwrap();
        chart
    }

    #[test]
    fn test_new_chart_is_empty_and_labelled_luminance() {
        let chart = ColorChart::new(RecordingBridge::default());
        assert!(chart.buffer().is_empty());
        assert_eq!(chart.channel(), SelectedChannel::Luminance);
        assert_eq!(chart.bridge().labels, vec!["Luminance".to_string()]);
    }

    #[test]
    fn test_select_chroma_after_set_data() {
        let mut chart = two_sample_chart();
        assert_eq!(chart.select_channel(SelectedChannel::Chroma), &[5.0, 6.0]);
        assert_eq!(chart.plotted(), &[5.0, 6.0]);
        assert_eq!(chart.bridge().labels.last().map(String::as_str), Some("Chroma"));
    }

    #[test]
    fn test_unrecognised_selector_plots_luminance() {
        let mut chart = two_sample_chart();
        let values = chart.select_channel(SelectedChannel::from_label("Brightness")).to_vec();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_set_data_notifies_once() {
        let chart = two_sample_chart();
        assert_eq!(chart.bridge().notifications, 1);
    }

    #[test]
    fn test_set_data_with_short_ids_fails_without_mutation() {
        let mut chart = two_sample_chart();
        let before = chart.buffer().clone();

        let err = chart
            .set_data(
                times(3),
                vec![0.0; 3],
                vec![0.0; 3],
                vec![0.0; 3],
                vec![0.0; 3],
                vec![0.0; 3],
                vec![0.0; 3],
                strings("/img/", 3),
                strings("uuid-", 2),
            )
            .unwrap_err();

        assert!(matches!(err, ValidationError::LengthMismatch { column: "ids", .. }));
        assert_eq!(chart.buffer(), &before);
        assert_eq!(chart.bridge().notifications, 1);
    }

    #[test]
    fn test_background_alpha_rule() {
        let mut chart = ColorChart::new(RecordingBridge::default());
        assert!(!chart.background().opaque);

        chart.set_background_color(99, 255, 255);
        assert!(!chart.background().opaque);

        chart.set_background_color(100, 0, 0);
        assert!(chart.background().opaque);
        assert_eq!(chart.background().rgb, (100, 0, 0));
    }
}
