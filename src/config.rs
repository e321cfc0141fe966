use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

use crate::radio::FrameMode;
use crate::relay::{default_endpoints, Endpoint};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub backend: BackendConfig,
    pub link: LinkConfig,
    pub dispatch: DispatchConfig,
    pub endpoints: Vec<Endpoint>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            backend: BackendConfig::default(),
            link: LinkConfig::default(),
            dispatch: DispatchConfig::default(),
            endpoints: default_endpoints(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    #[serde(deserialize_with = "humantime_duration")]
    pub receive_timeout: Duration,
    #[serde(deserialize_with = "humantime_duration")]
    pub poll_interval: Duration,
    pub frame_mode: FrameMode,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            receive_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(10),
            frame_mode: FrameMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
    #[serde(deserialize_with = "humantime_duration")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl BackendConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `http://<host>:<port>/api/v1/<endpoint>`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("http://{}/api/v1/{}", self.address(), endpoint)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// How long startup waits for the backend to become reachable.
    #[serde(deserialize_with = "humantime_duration")]
    pub wait: Duration,
    /// Interval between connection attempts while the link is down.
    #[serde(deserialize_with = "humantime_duration")]
    pub poll: Duration,
    /// Interval between health probes while the link is up.
    #[serde(deserialize_with = "humantime_duration")]
    pub probe_interval: Duration,
    #[serde(deserialize_with = "humantime_duration")]
    pub connect_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(50),
            poll: Duration::from_millis(100),
            probe_interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

/// Upper bound for `dispatch.max_in_flight`.
pub const MAX_IN_FLIGHT: usize = 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { max_in_flight: 4 }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::Invalid("no endpoints configured".into()));
        }
        for endpoint in &self.endpoints {
            if endpoint.name.trim().is_empty() || endpoint.name.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "invalid endpoint name {:?}",
                    endpoint.name
                )));
            }
            if endpoint.fields.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "endpoint {} has no fields",
                    endpoint.name
                )));
            }
        }
        if !(1..=MAX_IN_FLIGHT).contains(&self.dispatch.max_in_flight) {
            return Err(ConfigError::Invalid(format!(
                "dispatch.max_in_flight must be between 1 and {}",
                MAX_IN_FLIGHT
            )));
        }
        if self.serial.receive_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "serial.receive_timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
