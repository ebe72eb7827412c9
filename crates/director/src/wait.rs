//! Polling a task until it finishes.

use std::time::Duration;

use tokio::time::Instant;

use crate::{Client, Error, Result, Task};

/// Default upper bound on a single wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

impl Client {
    /// Poll `GET /tasks/{id}` until the task is done, errored or cancelled.
    ///
    /// A task that finishes in `error` is still `Ok`; callers inspect the
    /// state. The deadline also bounds each in-flight poll. On timeout the
    /// last snapshot is carried in [`Error::TaskWaitTimeout`], or
    /// [`Error::TaskPollTimeout`] if no poll ever completed. Transport
    /// errors end the wait.
    pub async fn wait_for_task(
        &self,
        id: u64,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Task> {
        let deadline = Instant::now() + timeout;
        let mut last: Option<Task> = None;

        loop {
            let task = match tokio::time::timeout_at(deadline, self.get_task(id)).await {
                Ok(polled) => polled?,
                Err(_) => {
                    tracing::warn!(task_id = id, ?timeout, "task poll outlived the wait");
                    return Err(match last {
                        Some(task) => Error::TaskWaitTimeout {
                            last: Box::new(task),
                            timeout,
                        },
                        None => Error::TaskPollTimeout { id, timeout },
                    });
                }
            };
            tracing::debug!(task_id = id, state = %task.state, "polled task");

            if task.state.is_terminal() {
                return Ok(task);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::TaskWaitTimeout {
                    last: Box::new(task),
                    timeout,
                });
            }
            last = Some(task);
            tokio::time::sleep(poll_interval.min(deadline - now)).await;
        }
    }
}
