// src/config.rs
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chart::SelectedChannel;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "./config.yml";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "color-dt")]
#[command(about = "Terminal chart of screenshot color metrics", long_about = None)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(env = "COLOR_DT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Plot synthetic samples instead of polling the endpoint
    #[arg(long)]
    pub demo: bool,
}

/// Everything the chart needs to know before it starts polling.
/// Missing keys in `config.yml` fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub base_url: String,
    pub data_path: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub log_dir: PathBuf,
    pub title: String,
    pub initial_channel: SelectedChannel,
    pub background: [u8; 3],
    /// Feed the chart from the synthetic source instead of the endpoint.
    pub demo: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            data_path: "/screenshot-data/".to_string(),
            poll_interval_ms: 1000,
            request_timeout_ms: 5000,
            log_dir: PathBuf::from("./logs"),
            title: "Color dT".to_string(),
            initial_channel: SelectedChannel::Luminance,
            background: [17, 17, 17],
            demo: false,
        }
    }
}

impl ChartConfig {
    /// Load the file named on the command line, then apply env overrides
    /// and `--demo`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Self::from_cli_with(cli, |key| std::env::var(key).ok())
    }

    pub fn from_cli_with<F>(cli: &Cli, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load(&cli.config)?;
        config.apply_overrides(lookup)?;
        if cli.demo {
            config.demo = true;
        }
        config.validate()?;
        Ok(config)
    }

    /// A missing file is not an error, it just means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("COLOR_DT_URL") {
            self.base_url = url;
        }
        if let Some(ms) = lookup("COLOR_DT_POLL_MS") {
            self.poll_interval_ms = ms
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("COLOR_DT_POLL_MS='{}' is not a number", ms)))?;
        }
        if let Some(demo) = lookup("COLOR_DT_DEMO") {
            self.demo = matches!(demo.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than zero".into());
        }
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!("base_url '{}' must be http(s)", self.base_url)));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn data_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.data_path)
    }
}
