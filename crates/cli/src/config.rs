//! Configuration loading from the server TOML file.

use std::path::Path;
use std::time::Duration;

use operations::WaitSettings;
use policy::Policy;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Credential source settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Task wait settings.
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Confirmation and blocking rules.
    #[serde(flatten)]
    pub policy: Policy,
}

/// Credential source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Seconds to reuse credentials fetched with `om bosh-env`.
    pub om_cache_ttl: u64,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            om_cache_ttl: auth::DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

impl CredentialsConfig {
    pub fn om_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.om_cache_ttl)
    }
}

/// Task wait settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Default seconds `bosh_task_wait` waits.
    pub wait_timeout: u64,

    /// Seconds between task polls.
    pub poll_interval: u64,
}

impl Default for TasksConfig {
    fn default() -> Self {
        let wait = WaitSettings::default();
        Self {
            wait_timeout: wait.timeout.as_secs(),
            poll_interval: wait.poll_interval.as_secs(),
        }
    }
}

impl TasksConfig {
    pub fn wait_settings(&self) -> WaitSettings {
        WaitSettings {
            timeout: Duration::from_secs(self.wait_timeout),
            poll_interval: Duration::from_secs(self.poll_interval),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        if self.tasks.poll_interval == 0 {
            return Err(Error::Config("tasks.poll_interval must be greater than zero".into()));
        }
        Ok(())
    }
}
