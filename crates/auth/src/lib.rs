//! BOSH Director credential resolution.
//!
//! Credentials are looked up through an ordered chain of sources; the first
//! one that yields a complete set wins:
//!
//! 1. [`EnvSource`]: `BOSH_ENVIRONMENT`, `BOSH_CLIENT`, `BOSH_CLIENT_SECRET`,
//!    `BOSH_CA_CERT`.
//! 2. [`ConfigFileSource`]: named environments in `~/.bosh/config`.
//! 3. [`OmSource`]: `om bosh-env`, cached in memory for a TTL.
//!
//! # Example
//!
//! ```no_run
//! use auth::Resolver;
//! use std::time::Duration;
//!
//! # async fn example() -> auth::Result<()> {
//! let resolver = Resolver::standard(None, Duration::from_secs(300));
//! let creds = resolver.resolve(Some("sandbox")).await?;
//! println!("director: {}", creds.environment);
//! # Ok(())
//! # }
//! ```

mod config;
mod credentials;
mod env;
mod error;
mod om;
mod resolver;

pub use config::{ConfigFileSource, default_path};
pub use credentials::Credentials;
pub use env::{
    BOSH_CA_CERT, BOSH_CLIENT, BOSH_CLIENT_SECRET, BOSH_ENVIRONMENT, EnvSource, Vars,
};
pub use error::{Error, Result};
pub use om::{DEFAULT_CACHE_TTL, OM_TARGET, OmSource, parse_bosh_env};
pub use resolver::{CredentialSource, Resolver};
