//! Tool input types.
//!
//! Field doc comments become the parameter descriptions in the tool schemas.

use schemars::JsonSchema;
use serde::Deserialize;

/// Input for tools that only need a Director.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct EnvironmentInput {
    /// Named environment from ~/.bosh/config. Defaults to the first
    /// credentials found (env vars, config file, om).
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeploymentInput {
    /// Deployment name.
    pub deployment: String,
    /// Named environment from ~/.bosh/config.
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TasksInput {
    /// Only tasks in this state (queued, processing, done, error, cancelled).
    pub state: Option<String>,
    /// Only tasks for this deployment.
    pub deployment: Option<String>,
    /// Maximum number of tasks to return.
    pub limit: Option<u32>,
    /// Named environment from ~/.bosh/config.
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TaskInput {
    /// Task id.
    pub id: u64,
    /// Also fetch a log: "result", "event" or "debug".
    pub output: Option<String>,
    /// Named environment from ~/.bosh/config.
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TaskWaitInput {
    /// Task id.
    pub id: u64,
    /// Seconds to wait before giving up. Defaults to the server setting.
    pub timeout: Option<u64>,
    /// Named environment from ~/.bosh/config.
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteDeploymentInput {
    /// Deployment to delete.
    pub deployment: String,
    /// Ignore errors while deleting.
    #[serde(default)]
    pub force: bool,
    /// Named environment from ~/.bosh/config.
    pub environment: Option<String>,
    /// Confirmation token from a previous call.
    pub confirm: Option<String>,
}

/// Instance index (number) or instance id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Index {
    Number(u64),
    Id(String),
}

impl Index {
    pub fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct JobInput {
    /// Deployment name.
    pub deployment: String,
    /// Instance group (job). All jobs when omitted.
    pub job: Option<String>,
    /// Instance index or id within the job. Requires `job`.
    pub index: Option<Index>,
    /// Named environment from ~/.bosh/config.
    pub environment: Option<String>,
    /// Confirmation token from a previous call.
    pub confirm: Option<String>,
}
