// src/poll/source.rs
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use std::time::Duration;

use super::payload::{RawSamplePayload, ScreenshotResponse};
use crate::config::ChartConfig;
use crate::error::FetchError;

/// Where samples come from. One call is one round trip: no retries, no
/// backoff. The poll loop decides what to do about failures.
#[async_trait]
pub trait PollSource: Send + Sync {
    async fn fetch(&self) -> Result<RawSamplePayload, FetchError>;
}

/// Polls the screenshot-data endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPollSource {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpPollSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let url = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }

    pub fn from_config(config: &ChartConfig) -> Result<Self, FetchError> {
        Self::new(&config.data_url(), config.request_timeout())
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }
}

#[async_trait]
impl PollSource for HttpPollSource {
    async fn fetch(&self) -> Result<RawSamplePayload, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let decoded: ScreenshotResponse = serde_json::from_slice(&body)?;
        Ok(decoded.data)
    }
}
