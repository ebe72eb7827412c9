//! Which operations need confirmation and which are refused outright.
//!
//! Core principle: **a blocked operation never reaches the Director, and
//! never gets a confirmation token.**

mod error;
mod policy;

pub use error::{Error, Result};
pub use policy::{DEFAULT_CONFIRM_OPERATIONS, DEFAULT_TOKEN_TTL_SECS, Policy};
