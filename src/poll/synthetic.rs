// src/poll/synthetic.rs
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::payload::RawSamplePayload;
use super::source::PollSource;
use crate::chart::{Sample, SampleColumns};
use crate::error::FetchError;

/// Offline stand-in for the endpoint: every fetch grows the series by one
/// random-walk sample, so every cycle produces a visible change.
#[derive(Debug)]
pub struct SyntheticSource {
    state: Mutex<SyntheticState>,
}

#[derive(Debug)]
struct SyntheticState {
    rng: StdRng,
    samples: SampleColumns,
    step: ChronoDuration,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(SyntheticState {
                rng,
                samples: SampleColumns::default(),
                step: ChronoDuration::seconds(1),
            }),
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticState {
    fn next_sample(&mut self) -> Sample {
        let index = self.samples.len();
        let timestamp = self
            .samples
            .timestamps
            .last()
            .map(|t| *t + self.step)
            .unwrap_or_else(Utc::now);

        let last = |column: &Vec<f64>, start: f64| column.last().copied().unwrap_or(start);
        let luminance = last(&self.samples.luminance, 50.0);
        let saturation = last(&self.samples.saturation, 0.5);
        let chroma = last(&self.samples.chroma, 30.0);
        let hue = last(&self.samples.hue, 180.0);
        let channel_a = last(&self.samples.channel_a, 0.0);
        let channel_b = last(&self.samples.channel_b, 0.0);

        let rng = &mut self.rng;
        Sample {
            timestamp,
            luminance: (luminance + rng.gen_range(-4.0..4.0)).clamp(0.0, 100.0),
            saturation: (saturation + rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0),
            chroma: (chroma + rng.gen_range(-3.0..3.0)).clamp(0.0, 150.0),
            hue: (hue + rng.gen_range(-10.0..10.0)).rem_euclid(360.0),
            channel_a: (channel_a + rng.gen_range(-5.0..5.0)).clamp(-128.0, 127.0),
            channel_b: (channel_b + rng.gen_range(-5.0..5.0)).clamp(-128.0, 127.0),
            image_url: String::new(),
            id: format!("synthetic-{}", index),
        }
    }
}

#[async_trait]
impl PollSource for SyntheticSource {
    async fn fetch(&self) -> Result<RawSamplePayload, FetchError> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let sample = state.next_sample();
        state.samples.push(sample);
        Ok(RawSamplePayload::from(&state.samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_each_fetch_grows_by_one() {
        let source = SyntheticSource::with_seed(7);
        for expected in 1..=5 {
            let payload = source.fetch().await.unwrap();
            assert_eq!(payload.len(), expected);
        }
    }

    #[tokio::test]
    async fn test_values_stay_in_range_and_columns_line_up() {
        let source = SyntheticSource::with_seed(42);
        let mut payload = RawSamplePayload::default();
        for _ in 0..200 {
            payload = source.fetch().await.unwrap();
        }
        assert!(payload.hue.iter().all(|h| (0.0..360.0).contains(h)));
        assert!(payload.saturation.iter().all(|s| (0.0..=1.0).contains(s)));

        let columns = payload.into_columns().unwrap();
        assert_eq!(columns.len(), 200);
        assert!(columns.timestamps.windows(2).all(|w| w[0] < w[1]));
    }
}
