use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use url::form_urlencoded::byte_serialize;

pub const PROLIFIC_COMPLETE_URL: &str = "https://app.prolific.com/submissions/complete";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("completion code must not be empty")]
    MissingCompletionCode,

    #[error("redirect URL must be http(s), got {0:?}")]
    InvalidRedirectUrl(String),

    #[error("test block needs at least one repetition")]
    NoRepetitions,

    #[error("save timeout must be greater than zero")]
    ZeroSaveTimeout,
}

/// Where the participant goes once the run is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Full redirect URL; derived from the completion code when absent.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub completion_code: String,
    #[serde(default = "default_redirect_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            url: None,
            completion_code: String::new(),
            delay_ms: default_redirect_delay_ms(),
        }
    }
}

impl RedirectConfig {
    pub fn redirect_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => {
                let code: String = byte_serialize(self.completion_code.as_bytes()).collect();
                format!("{PROLIFIC_COMPLETE_URL}?cc={code}")
            }
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Operator debug mode: verbose saves, data display instead of redirect.
    #[serde(default)]
    pub debug: bool,
    /// Saves go to the in-memory store.
    #[serde(default)]
    pub mock_store: bool,
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default = "default_post_trial_gap_ms")]
    pub post_trial_gap_ms: u64,
    #[serde(default = "default_save_timeout_ms")]
    pub save_timeout_ms: u64,
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    /// Fixes the test-block shuffle when set.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_redirect_delay_ms() -> u64 {
    3000
}

fn default_post_trial_gap_ms() -> u64 {
    2000
}

fn default_save_timeout_ms() -> u64 {
    10_000
}

fn default_repetitions() -> usize {
    1
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            debug: false,
            mock_store: false,
            redirect: RedirectConfig::default(),
            post_trial_gap_ms: default_post_trial_gap_ms(),
            save_timeout_ms: default_save_timeout_ms(),
            repetitions: default_repetitions(),
            seed: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redirect.completion_code.trim().is_empty() {
            return Err(ConfigError::MissingCompletionCode);
        }
        let url = self.redirect.redirect_url();
        match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidRedirectUrl(url)),
        }
        if self.repetitions == 0 {
            return Err(ConfigError::NoRepetitions);
        }
        if self.save_timeout_ms == 0 {
            return Err(ConfigError::ZeroSaveTimeout);
        }
        Ok(())
    }

    pub fn post_trial_gap(&self) -> Duration {
        Duration::from_millis(self.post_trial_gap_ms)
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }
}
