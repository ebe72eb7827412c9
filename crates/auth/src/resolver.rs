//! Ordered credential chain.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::{ConfigFileSource, Credentials, EnvSource, Error, OmSource, Result};

/// A place credentials may come from.
///
/// `Ok(None)` means "nothing here, try the next source"; errors stop the chain.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Look up credentials, optionally for a named environment.
    async fn credentials(&self, environment: Option<&str>) -> Result<Option<Credentials>>;
}

/// Tries each source in order; the first hit wins.
pub struct Resolver {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// Environment variables, then the credential file, then `om bosh-env`.
    ///
    /// `bosh_config` overrides the default `~/.bosh/config` location.
    pub fn standard(bosh_config: Option<PathBuf>, om_cache_ttl: Duration) -> Self {
        let config = match bosh_config {
            Some(path) => ConfigFileSource::new(path),
            None => ConfigFileSource::from_home(),
        };

        Self::new(vec![
            Box::new(EnvSource::new()),
            Box::new(config),
            Box::new(OmSource::new().with_cache_ttl(om_cache_ttl)),
        ])
    }

    /// Resolve credentials, optionally targeting a named environment.
    pub async fn resolve(&self, environment: Option<&str>) -> Result<Credentials> {
        let environment = environment.filter(|e| !e.is_empty());

        for source in &self.sources {
            if let Some(creds) = source.credentials(environment).await? {
                tracing::debug!(
                    source = source.name(),
                    environment = %creds.environment,
                    "resolved credentials"
                );
                return Ok(creds);
            }
        }

        Err(Error::NoCredentials)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("Resolver").field("sources", &names).finish()
    }
}
