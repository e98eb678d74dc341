use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProxyConfig {
    pub listen: ListenConfig,
    pub upstream: UpstreamConfig,
    pub limits: BufferLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

/// Both sides are read exactly once; anything past these sizes is cut off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BufferLimits {
    pub max_request_bytes: usize,
    pub max_response_bytes: usize,
}

impl ProxyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ProxyError> {
        let config: ProxyConfig =
            toml::from_str(text).map_err(|err| ProxyError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProxyError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ProxyError::Config(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ProxyError> {
        if self.listen.backlog == 0 {
            return Err(ProxyError::Config("listen.backlog must be positive".to_string()));
        }
        if self.upstream.connect_timeout_ms == 0 || self.upstream.read_timeout_ms == 0 {
            return Err(ProxyError::Config(
                "upstream timeouts must be positive".to_string(),
            ));
        }
        if self.limits.max_request_bytes == 0 || self.limits.max_response_bytes == 0 {
            return Err(ProxyError::Config("buffer limits must be positive".to_string()));
        }
        Ok(())
    }
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18888,
            backlog: 20,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            read_timeout_ms: 10_000,
        }
    }
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self {
            max_request_bytes: 10_000,
            max_response_bytes: 10_000,
        }
    }
}
