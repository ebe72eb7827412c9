//! Operation handler error types.

use thiserror::Error;

/// Operation handler errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The confirmation token is unknown, used, expired, or for another target.
    #[error("invalid or expired confirmation token")]
    InvalidToken,

    /// The operation is refused by policy.
    #[error("operation '{0}' is blocked by policy")]
    Blocked(&'static str),

    /// A required argument was missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Auth(#[from] auth::Error),

    #[error(transparent)]
    Director(#[from] director::Error),

    #[error(transparent)]
    Confirm(#[from] confirm::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
