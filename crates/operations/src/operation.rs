use std::fmt;

use director::JobState;
use serde::Serialize;

use crate::{Error, Result};

/// A state-changing operation, named by its policy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DeleteDeployment,
    Recreate,
    Stop,
    Start,
    Restart,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeleteDeployment => "delete_deployment",
            Self::Recreate => "recreate",
            Self::Stop => "stop",
            Self::Start => "start",
            Self::Restart => "restart",
        }
    }

    /// The operation a job state change is gated as.
    pub fn for_job_state(state: JobState) -> Self {
        match state {
            JobState::Recreate => Self::Recreate,
            JobState::Stopped => Self::Stop,
            JobState::Started => Self::Start,
            JobState::Restart => Self::Restart,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an operation acts on: a deployment, optionally narrowed to a job
/// and an instance of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub deployment: String,
    pub job: Option<String>,
    pub index: Option<String>,
}

impl Target {
    pub fn deployment(deployment: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
            ..Default::default()
        }
    }

    pub fn job(deployment: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            deployment: deployment.into(),
            job: Some(job.into()),
            index: None,
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Drop empty optional parts and reject targets that name nothing.
    pub(crate) fn normalized(mut self) -> Result<Self> {
        self.deployment = self.deployment.trim().to_string();
        self.job = self.job.map(|j| j.trim().to_string()).filter(|j| !j.is_empty());
        self.index = self.index.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());

        if self.deployment.is_empty() {
            return Err(Error::MissingField("deployment"));
        }
        if self.index.is_some() && self.job.is_none() {
            return Err(Error::MissingField("job"));
        }
        Ok(self)
    }

    /// Key a confirmation token is bound to: `deployment`, `deployment/job`
    /// or `deployment/job/index`.
    pub fn resource(&self) -> String {
        match (&self.job, &self.index) {
            (Some(job), Some(index)) => format!("{}/{job}/{index}", self.deployment),
            (Some(job), None) => format!("{}/{job}", self.deployment),
            _ => self.deployment.clone(),
        }
    }
}

/// Result of a gated call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// No token was presented; nothing was sent to the Director.
    ConfirmationRequired(ConfirmationRequired),
    /// The Director accepted the request and queued a task.
    Submitted(Submitted),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationRequired {
    pub requires_confirmation: bool,
    pub confirmation_token: String,
    pub operation: &'static str,
    pub deployment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub expires_in_seconds: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submitted {
    pub task_id: u64,
    pub state: &'static str,
    pub operation: &'static str,
    pub deployment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub message: String,
}
