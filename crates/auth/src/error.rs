//! Credential resolution errors.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Credential errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Every source in the chain came up empty.
    #[error("no BOSH credentials available (set BOSH_ENVIRONMENT/BOSH_CLIENT/BOSH_CLIENT_SECRET, add ~/.bosh/config, or set OM_TARGET)")]
    NoCredentials,

    /// The credential file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credential file is not valid YAML for the expected layout.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The external credential helper could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external credential helper ran but reported failure.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
