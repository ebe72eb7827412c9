//! Named-environment credential file (`~/.bosh/config`).
//!
//! ```yaml
//! environments:
//!   prod:
//!     url: https://10.0.0.5:25555
//!     client: admin
//!     client_secret: secret
//!     ca_cert: /path/to/ca.pem
//! ```
//!
//! Without a requested name the first entry of the mapping is used. When the
//! file holds several environments that choice is not something callers should
//! rely on; pass a name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::{CredentialSource, Credentials, Error, Result};

#[derive(Debug, Deserialize)]
struct BoshConfig {
    #[serde(default)]
    environments: serde_yaml::Mapping,
}

#[derive(Debug, Default, Deserialize)]
struct Environment {
    #[serde(default)]
    url: String,
    #[serde(default)]
    client: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    ca_cert: Option<String>,
}

impl From<Environment> for Credentials {
    fn from(env: Environment) -> Self {
        let creds = Credentials::new(env.url, env.client, env.client_secret);
        match env.ca_cert {
            Some(ca) => creds.with_ca_cert(ca),
            None => creds,
        }
    }
}

/// Reads credentials from a YAML file of named environments.
#[derive(Debug, Clone)]
pub struct ConfigFileSource {
    path: Option<PathBuf>,
}

impl ConfigFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Use `$HOME/.bosh/config`; a missing `HOME` disables the source.
    pub fn from_home() -> Self {
        Self {
            path: default_path(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// `$HOME/.bosh/config`.
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".bosh").join("config"))
}

#[async_trait]
impl CredentialSource for ConfigFileSource {
    fn name(&self) -> &'static str {
        "config"
    }

    async fn credentials(&self, environment: Option<&str>) -> Result<Option<Credentials>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::Read {
                    path: path.clone(),
                    source,
                });
            }
        };

        parse(&content, environment).map_err(|source| Error::Parse {
            path: path.clone(),
            source,
        })
    }
}

fn parse(
    content: &str,
    environment: Option<&str>,
) -> std::result::Result<Option<Credentials>, serde_yaml::Error> {
    // An empty document deserialises to unit, not a struct.
    if content.trim().is_empty() {
        return Ok(None);
    }

    let config: BoshConfig = serde_yaml::from_str(content)?;

    let entry = match environment {
        Some(name) => config.environments.get(name),
        None => config.environments.values().next(),
    };
    let Some(entry) = entry else {
        return Ok(None);
    };

    let env: Environment = serde_yaml::from_value(entry.clone())?;
    let creds = Credentials::from(env);
    Ok(creds.is_valid().then_some(creds))
}
