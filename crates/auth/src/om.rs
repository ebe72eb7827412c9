//! Ops Manager credential source (`om bosh-env`).
//!
//! The helper is only consulted when `OM_TARGET` is set. Its output is cached
//! for a TTL; the cache lock is held across the subprocess call so concurrent
//! resolutions inside the window share one invocation.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::env::{BOSH_CA_CERT, BOSH_CLIENT, BOSH_CLIENT_SECRET, BOSH_ENVIRONMENT, Vars};
use crate::{CredentialSource, Credentials, Error, Result};

/// Default cache lifetime for helper-derived credentials.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Gate variable: the source is skipped unless this is set.
pub const OM_TARGET: &str = "OM_TARGET";

const DEFAULT_PROGRAM: &str = "om";
const DEFAULT_SUBCOMMAND: &str = "bosh-env";

#[derive(Debug)]
struct Cached {
    credentials: Credentials,
    fetched_at: Instant,
}

/// Fetches transient credentials from the `om` CLI.
#[derive(Debug)]
pub struct OmSource {
    program: String,
    args: Vec<String>,
    vars: Vars,
    cache_ttl: Duration,
    cache: Mutex<Option<Cached>>,
}

impl OmSource {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: vec![DEFAULT_SUBCOMMAND.to_string()],
            vars: Vars::process(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Mutex::new(None),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_vars(mut self, vars: Vars) -> Self {
        self.vars = vars;
        self
    }

    /// Replace the helper invocation.
    pub fn with_command(
        mut self,
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.program = program.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn fetch(&self) -> Result<Option<Credentials>> {
        let command = self.command_line();
        tracing::debug!(%command, "fetching credentials from external helper");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_bosh_env(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for OmSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for OmSource {
    fn name(&self) -> &'static str {
        "om"
    }

    async fn credentials(&self, _environment: Option<&str>) -> Result<Option<Credentials>> {
        if self.vars.get(OM_TARGET).is_none() {
            return Ok(None);
        }

        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.cache_ttl {
                tracing::debug!("using cached om credentials");
                return Ok(Some(cached.credentials.clone()));
            }
        }

        let fetched = self.fetch().await?;
        if let Some(credentials) = &fetched {
            *cache = Some(Cached {
                credentials: credentials.clone(),
                fetched_at: Instant::now(),
            });
        }
        Ok(fetched)
    }
}

/// Parse `export KEY=VALUE` lines into credentials.
///
/// Unknown keys are ignored; the result is `None` unless the three required
/// fields are present.
pub fn parse_bosh_env(output: &str) -> Option<Credentials> {
    let mut creds = Credentials::default();

    for line in output.lines() {
        let line = line.trim();
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim()).to_string();

        match key.trim() {
            BOSH_ENVIRONMENT => creds.environment = value,
            BOSH_CLIENT => creds.client = value,
            BOSH_CLIENT_SECRET => creds.client_secret = value,
            BOSH_CA_CERT => creds = creds.with_ca_cert(value),
            _ => {}
        }
    }

    creds.is_valid().then_some(creds)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
