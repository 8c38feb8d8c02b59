// src/chart/buffer.rs
use chrono::{DateTime, Utc};
use std::ops::Range;

use super::channel::SelectedChannel;
use super::sample::Sample;
use crate::error::ValidationError;

/// Column-oriented sample data, one `Vec` per field, index-aligned.
/// Only [`DataBuffer`] guarantees the columns agree; a bare `SampleColumns`
/// may be ragged until it is validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleColumns {
    pub timestamps: Vec<DateTime<Utc>>,
    pub luminance: Vec<f64>,
    pub saturation: Vec<f64>,
    pub chroma: Vec<f64>,
    pub hue: Vec<f64>,
    pub channel_a: Vec<f64>,
    pub channel_b: Vec<f64>,
    pub image_urls: Vec<String>,
    pub ids: Vec<String>,
}

impl SampleColumns {
    /// Length of the first column (timestamps), which every other column must match.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Returns the common length, or the first column that disagrees with it.
    pub fn validate(&self) -> Result<usize, ValidationError> {
        let expected = self.timestamps.len();
        let lengths = [
            ("luminance", self.luminance.len()),
            ("saturation", self.saturation.len()),
            ("chroma", self.chroma.len()),
            ("hue", self.hue.len()),
            ("a", self.channel_a.len()),
            ("b", self.channel_b.len()),
            ("urls", self.image_urls.len()),
            ("ids", self.ids.len()),
        ];

        for (column, actual) in lengths {
            if actual != expected {
                return Err(ValidationError::LengthMismatch { column, expected, actual });
            }
        }
        Ok(expected)
    }

    pub fn push(&mut self, sample: Sample) {
        self.timestamps.push(sample.timestamp);
        self.luminance.push(sample.luminance);
        self.saturation.push(sample.saturation);
        self.chroma.push(sample.chroma);
        self.hue.push(sample.hue);
        self.channel_a.push(sample.channel_a);
        self.channel_b.push(sample.channel_b);
        self.image_urls.push(sample.image_url);
        self.ids.push(sample.id);
    }
}

impl FromIterator<Sample> for SampleColumns {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let mut columns = SampleColumns::default();
        for sample in iter {
            columns.push(sample);
        }
        columns
    }
}

/// The chart's data. Always holds equal-length columns; replacement is
/// all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataBuffer {
    columns: SampleColumns,
}

impl DataBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Swap in new columns. On error the previous data stays untouched.
    pub fn replace(&mut self, columns: SampleColumns) -> Result<usize, ValidationError> {
        let len = columns.validate()?;
        self.columns = columns;
        Ok(len)
    }

    pub fn replace_samples(&mut self, samples: impl IntoIterator<Item = Sample>) -> usize {
        self.columns = samples.into_iter().collect();
        self.columns.len()
    }

    pub fn select_channel(&self, channel: SelectedChannel) -> &[f64] {
        match channel {
            SelectedChannel::Saturation => &self.columns.saturation,
            SelectedChannel::Chroma => &self.columns.chroma,
            SelectedChannel::Hue => &self.columns.hue,
            SelectedChannel::ChannelA => &self.columns.channel_a,
            SelectedChannel::ChannelB => &self.columns.channel_b,
            SelectedChannel::Luminance => &self.columns.luminance,
        }
    }

    pub fn columns(&self) -> &SampleColumns {
        &self.columns
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.columns.timestamps
    }

    pub fn image_urls(&self) -> &[String] {
        &self.columns.image_urls
    }

    pub fn ids(&self) -> &[String] {
        &self.columns.ids
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        let c = &self.columns;
        Some(Sample {
            timestamp: *c.timestamps.get(index)?,
            luminance: c.luminance[index],
            saturation: c.saturation[index],
            chroma: c.chroma[index],
            hue: c.hue[index],
            channel_a: c.channel_a[index],
            channel_b: c.channel_b[index],
            image_url: c.image_urls[index].clone(),
            id: c.ids[index].clone(),
        })
    }

    /// Earliest and latest timestamp inside `range`.
    pub fn time_bounds(&self, range: Range<usize>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let slice = self.columns.timestamps.get(range)?;
        let min = slice.iter().min()?;
        let max = slice.iter().max()?;
        Some((*min, *max))
    }

    /// Min and max of the selected channel inside `range`, ignoring NaNs.
    pub fn value_bounds(&self, channel: SelectedChannel, range: Range<usize>) -> Option<(f64, f64)> {
        let values = self.select_channel(channel).get(range)?;
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(i: usize) -> Sample {
        Sample {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(),
            luminance: i as f64,
            saturation: 10.0 + i as f64,
            chroma: 20.0 + i as f64,
            hue: 30.0 + i as f64,
            channel_a: 40.0 + i as f64,
            channel_b: 50.0 + i as f64,
            image_url: format!("/thumb/{}.jpg", i),
            id: format!("id-{}", i),
        }
    }

    fn columns(n: usize) -> SampleColumns {
        (0..n).map(row).collect()
    }

    #[test]
    fn test_replace_sets_every_column_to_payload_length() {
        let mut buffer = DataBuffer::new();
        assert!(buffer.is_empty());

        for n in [0, 1, 7] {
            assert_eq!(buffer.replace(columns(n)).unwrap(), n);
            let c = buffer.columns();
            for len in [
                c.timestamps.len(), c.luminance.len(), c.saturation.len(), c.chroma.len(),
                c.hue.len(), c.channel_a.len(), c.channel_b.len(), c.image_urls.len(), c.ids.len(),
            ] {
                assert_eq!(len, n);
            }
        }
    }

    #[test]
    fn test_mismatched_replace_fails_and_keeps_previous_data() {
        let mut buffer = DataBuffer::new();
        buffer.replace(columns(3)).unwrap();
        let before = buffer.clone();

        let mut ragged = columns(5);
        ragged.luminance.pop();

        let err = buffer.replace(ragged).unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch { column: "luminance", expected: 5, actual: 4 }
        );
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_select_channel_maps_each_variant() {
        let mut buffer = DataBuffer::new();
        buffer.replace(columns(2)).unwrap();

        assert_eq!(buffer.select_channel(SelectedChannel::Luminance), &[0.0, 1.0]);
        assert_eq!(buffer.select_channel(SelectedChannel::Saturation), &[10.0, 11.0]);
        assert_eq!(buffer.select_channel(SelectedChannel::Chroma), &[20.0, 21.0]);
        assert_eq!(buffer.select_channel(SelectedChannel::Hue), &[30.0, 31.0]);
        assert_eq!(buffer.select_channel(SelectedChannel::ChannelA), &[40.0, 41.0]);
        assert_eq!(buffer.select_channel(SelectedChannel::ChannelB), &[50.0, 51.0]);
        assert_eq!(
            buffer.select_channel(SelectedChannel::from_label("???")),
            buffer.select_channel(SelectedChannel::Luminance)
        );
    }

    #[test]
    fn test_sample_reassembles_row() {
        let mut buffer = DataBuffer::new();
        buffer.replace(columns(3)).unwrap();

        let row = buffer.sample(2).unwrap();
        assert_eq!(row.hue, 32.0);
        assert_eq!(row.image_url, "/thumb/2.jpg");
        assert_eq!(row.id, "id-2");
        assert!(buffer.sample(3).is_none());
    }

    #[test]
    fn test_bounds_ignore_nan_and_respect_range() {
        let mut data = columns(4);
        data.chroma = vec![5.0, f64::NAN, -2.0, 9.0];
        let mut buffer = DataBuffer::new();
        buffer.replace(data).unwrap();

        assert_eq!(buffer.value_bounds(SelectedChannel::Chroma, 0..3), Some((-2.0, 5.0)));
        assert_eq!(buffer.value_bounds(SelectedChannel::Chroma, 0..4), Some((-2.0, 9.0)));
        assert_eq!(buffer.value_bounds(SelectedChannel::Chroma, 2..9), None);

        let (lo, hi) = buffer.time_bounds(1..3).unwrap();
        assert_eq!((hi - lo).num_seconds(), 1);
    }

    #[test]
    fn test_replace_samples_discards_previous_rows() {
        let mut buffer = DataBuffer::new();
        buffer.replace(columns(5)).unwrap();

        assert_eq!(buffer.replace_samples((0..3).map(row)), 3);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.columns().validate(), Ok(3));
        assert_eq!(buffer.ids(), &["id-0", "id-1", "id-2"]);
        assert_eq!(buffer.select_channel(SelectedChannel::ChannelB), &[50.0, 51.0, 52.0]);
        assert_eq!(buffer.sample(2).map(|s| s.image_url), Some("/thumb/2.jpg".to_string()));
    }
}
