//! Director client error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::Task;

/// Director client errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The Director rejected the request.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// A state-changing request came back without a redirect to a task.
    #[error("unexpected status {status} (expected 302 or 202 with a task location): {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The redirect carried no `Location` header.
    #[error("task location missing from response")]
    TaskLocationMissing,

    /// The `Location` header did not point at `/tasks/{id}`.
    #[error("malformed task location: {0}")]
    TaskLocationMalformed(String),

    /// The task did not reach a terminal state in time.
    #[error("task {} still {} after {:?}", .last.id, .last.state, .timeout)]
    TaskWaitTimeout { last: Box<Task>, timeout: Duration },

    /// The wait ran out before the Director answered a single poll.
    #[error("no response for task {id} within {timeout:?}")]
    TaskPollTimeout { id: u64, timeout: Duration },

    /// The Director address could not be turned into a URL.
    #[error("invalid director URL: {0}")]
    InvalidUrl(String),

    /// The CA certificate file could not be read.
    #[error("failed to read CA certificate {path}: {source}")]
    CaCertRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport, TLS or body-decoding failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response body was not the JSON shape we expected.
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
