use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::transcript::{FLEET_CAPACITY, HOST_CAPACITY};

pub fn default_base_url() -> String {
    "http://127.0.0.1:8080".into()
}

pub fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

pub fn default_host_capacity() -> usize {
    HOST_CAPACITY
}

pub fn default_fleet_capacity() -> usize {
    FLEET_CAPACITY
}

pub fn default_host_prompt() -> String {
    "root@deck:~$".into()
}

pub fn default_fleet_prompt() -> String {
    "ops@deck:~$".into()
}

/// The poll interval is written as whole seconds in YAML.
mod whole_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(period: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(period.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed reading config file `{0}`.")]
    Read(String, #[source] std::io::Error),
    #[error("Failed parsing config.")]
    Parse(
        #[from]
        #[source]
        serde_yaml::Error,
    ),
    #[error("Config key `{0}` is invalid: {1}")]
    Invalid(&'static str, String),
}

/// Console settings, usually read from a YAML file. Every key is optional.
#[derive(Getters, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleConfig {
    #[serde(default = "self::default_base_url")]
    base_url: String,
    #[getter(skip)]
    #[serde(
        rename = "poll_interval_secs",
        default = "self::default_poll_interval",
        with = "whole_secs"
    )]
    poll_interval: Duration,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default = "self::default_host_capacity")]
    host_capacity: usize,
    #[serde(default = "self::default_fleet_capacity")]
    fleet_capacity: usize,
    #[serde(default = "self::default_host_prompt")]
    host_prompt: String,
    #[serde(default = "self::default_fleet_prompt")]
    fleet_prompt: String,
    #[serde(default)]
    banner: Banner,
}

/// Lines written to each transcript when the console starts.
#[derive(Getters, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Banner {
    #[serde(default)]
    host: Vec<String>,
    #[serde(default)]
    fleet: Vec<String>,
}

impl Banner {
    pub fn new(host: Vec<String>, fleet: Vec<String>) -> Self {
        Self { host, fleet }
    }
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            host: vec!["Console initialized.".into(), "Ready for input.".into()],
            fleet: vec![
                "Client management online.".into(),
                "Ready to execute commands on client machines.".into(),
            ],
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval: default_poll_interval(),
            request_timeout_secs: None,
            host_capacity: default_host_capacity(),
            fleet_capacity: default_fleet_capacity(),
            host_prompt: default_host_prompt(),
            fleet_prompt: default_fleet_prompt(),
            banner: Banner::default(),
        }
    }
}

impl ConsoleConfig {
    #[tracing::instrument]
    pub async fn load<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| ConfigError::Read(path.as_ref().display().to_string(), e))?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url", "must not be empty".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval_secs",
                "must be positive".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_secs",
                "must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, period: Duration) -> Self {
        self.poll_interval = period;
        self
    }

    pub fn with_capacities(mut self, host: usize, fleet: usize) -> Self {
        self.host_capacity = host;
        self.fleet_capacity = fleet;
        self
    }

    pub fn with_banner(mut self, banner: Banner) -> Self {
        self.banner = banner;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
