//! Single-use confirmation tokens for destructive operations.
//!
//! A token is bound to one operation and one resource. It can be redeemed
//! once, for exactly that pair, before it expires.

mod error;
mod store;

pub use error::{Error, Result};
pub use store::{DEFAULT_TTL, PendingToken, TOKEN_PREFIX, TokenStore};
