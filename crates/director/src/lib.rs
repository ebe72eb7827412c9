//! Client for the BOSH Director REST API.
//!
//! Reads decode JSON into the types in this crate. State-changing calls
//! (delete, job state changes) return the id of the task the Director
//! queued; [`Client::wait_for_task`] polls it to completion.
//!
//! # Example
//!
//! ```no_run
//! use auth::Credentials;
//! use director::{Client, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
//!
//! # async fn example() -> director::Result<()> {
//! let client = Client::new(&Credentials::new("10.0.0.5", "admin", "secret")).await?;
//! let task_id = client.recreate("cf", Some("router"), None).await?;
//! let task = client
//!     .wait_for_task(task_id, DEFAULT_WAIT_TIMEOUT, DEFAULT_POLL_INTERVAL)
//!     .await?;
//! println!("task {} {}", task.id, task.state);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;
mod wait;

pub use client::{Client, DEFAULT_PORT, REQUEST_TIMEOUT};
pub use error::{Error, Result};
pub use types::{
    Config, ConfigType, Deployment, Instance, JobState, Lock, NameVersion, Process, Release,
    ReleaseVersion, Stemcell, StemcellDeployment, Task, TaskFilter, TaskOutput, TaskState,
    Variable, Vm,
};
pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
