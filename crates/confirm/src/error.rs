//! Token store error types.

use thiserror::Error;

/// Token store errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The OS random source failed; no token was issued.
    #[error("failed to generate confirmation token: {0}")]
    Entropy(#[from] rand::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
