use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::translation::context::DEFAULT_CONTEXT_SIZE;
use crate::translation::core::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_PAUSE};
use crate::translation::progress::DEFAULT_PROGRESS_INTERVAL;

/// Application configuration module
/// This module handles loading and validating configuration settings.
/// Every field has a default, so a config file only needs the values it changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language name or ISO code
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language name or ISO code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Ollama model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Timeout for one model call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Time budget for the whole run, in seconds
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Pause after each failed alternate attempt, in milliseconds
    #[serde(default = "default_retry_pause_ms")]
    pub retry_pause_ms: u64,

    /// Number of previous translations offered as context
    #[serde(default = "default_context_window_size")]
    pub context_window_size: usize,

    /// Interval between progress redraws, in milliseconds
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Sampling temperature; the model default is used when absent
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Largest accepted context window
pub const MAX_CONTEXT_WINDOW_SIZE: usize = 10;

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Español neutro".to_string()
}

fn default_model() -> String {
    "phi4".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_run_timeout_secs() -> u64 {
    7200 // Two hours for the whole file
}

fn default_retry_pause_ms() -> u64 {
    DEFAULT_RETRY_PAUSE.as_millis() as u64
}

fn default_context_window_size() -> usize {
    DEFAULT_CONTEXT_SIZE
}

fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL.as_millis() as u64
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load the configuration file if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("Model name cannot be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language cannot be empty"));
        }

        let url = Url::parse(&self.endpoint).with_context(|| format!("Invalid endpoint URL: {}", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("Endpoint must use http or https: {}", self.endpoint));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow!("Request timeout must be greater than zero"));
        }
        if self.run_timeout_secs == 0 {
            return Err(anyhow!("Run timeout must be greater than zero"));
        }
        if self.context_window_size > MAX_CONTEXT_WINDOW_SIZE {
            return Err(anyhow!(
                "Context window size {} exceeds the maximum of {}",
                self.context_window_size,
                MAX_CONTEXT_WINDOW_SIZE
            ));
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", temperature));
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            model: default_model(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            run_timeout_secs: default_run_timeout_secs(),
            retry_pause_ms: default_retry_pause_ms(),
            context_window_size: default_context_window_size(),
            progress_interval_ms: default_progress_interval_ms(),
            temperature: None,
            log_level: LogLevel::default(),
        }
    }
}
