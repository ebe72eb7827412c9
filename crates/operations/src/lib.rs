//! Operation handlers: the gated state machine in front of every
//! state-changing Director call, plus the read-only queries.
//!
//! A gated call goes through, in order:
//!
//! 1. **Policy**: a blocked operation is refused outright.
//! 2. **Confirmation**: without a token, one is minted and returned
//!    ([`Outcome::ConfirmationRequired`]) and the Director is not contacted.
//!    With a token, it must redeem for exactly this operation and target.
//! 3. **Execute**: the request is sent and the queued task id returned
//!    ([`Outcome::Submitted`]).

mod error;
mod handlers;
mod operation;

pub use error::{Error, Result};
pub use handlers::{Operations, TaskReport, WaitSettings};
pub use operation::{ConfirmationRequired, Operation, Outcome, Submitted, Target};
