//! Environment-variable credential source.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{CredentialSource, Credentials, Result};

pub const BOSH_ENVIRONMENT: &str = "BOSH_ENVIRONMENT";
pub const BOSH_CLIENT: &str = "BOSH_CLIENT";
pub const BOSH_CLIENT_SECRET: &str = "BOSH_CLIENT_SECRET";
pub const BOSH_CA_CERT: &str = "BOSH_CA_CERT";

/// Variable lookup used by the sources that consult the environment.
///
/// Empty values read as unset.
#[derive(Clone)]
pub struct Vars(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>);

impl Vars {
    /// Read from the process environment.
    pub fn process() -> Self {
        Self(Arc::new(|key| std::env::var(key).ok()))
    }

    /// Read from a fixed set of pairs (useful for testing).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(Arc::new(move |key| map.get(key).cloned()))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }
}

impl fmt::Debug for Vars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Vars(..)")
    }
}

/// Reads `BOSH_ENVIRONMENT`, `BOSH_CLIENT`, `BOSH_CLIENT_SECRET` and `BOSH_CA_CERT`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    vars: Vars,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::with_vars(Vars::process())
    }

    pub fn with_vars(vars: Vars) -> Self {
        Self { vars }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for EnvSource {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn credentials(&self, _environment: Option<&str>) -> Result<Option<Credentials>> {
        let creds = Credentials {
            environment: self.vars.get(BOSH_ENVIRONMENT).unwrap_or_default(),
            client: self.vars.get(BOSH_CLIENT).unwrap_or_default(),
            client_secret: self.vars.get(BOSH_CLIENT_SECRET).unwrap_or_default(),
            ca_cert: self.vars.get(BOSH_CA_CERT),
        };

        Ok(creds.is_valid().then_some(creds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_all_four_variables() {
        let source = EnvSource::with_vars(Vars::from_pairs([
            (BOSH_ENVIRONMENT, "https://10.0.0.5:25555"),
            (BOSH_CLIENT, "admin"),
            (BOSH_CLIENT_SECRET, "secret123"),
            (BOSH_CA_CERT, "/path/to/ca.crt"),
        ]));

        let creds = source.credentials(None).await.unwrap().unwrap();
        assert_eq!(creds.environment, "https://10.0.0.5:25555");
        assert_eq!(creds.client, "admin");
        assert_eq!(creds.client_secret, "secret123");
        assert_eq!(creds.ca_cert.as_deref(), Some("/path/to/ca.crt"));
    }

    #[tokio::test]
    async fn missing_required_yields_none() {
        let source = EnvSource::with_vars(Vars::from_pairs([
            (BOSH_ENVIRONMENT, "https://10.0.0.5:25555"),
            (BOSH_CLIENT, "admin"),
        ]));
        assert!(source.credentials(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_values_count_as_unset() {
        let source = EnvSource::with_vars(Vars::from_pairs([
            (BOSH_ENVIRONMENT, ""),
            (BOSH_CLIENT, ""),
            (BOSH_CLIENT_SECRET, ""),
        ]));
        assert!(source.credentials(None).await.unwrap().is_none());
    }
}
