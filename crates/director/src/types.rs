//! BOSH Director wire types.
//!
//! Only the fields the tools report are modelled; everything is defaulted so
//! older or newer Directors that omit a field still decode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a Director task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Processing,
    Done,
    Error,
    Cancelled,
    Timeout,
    Cancelling,
    #[serde(other)]
    Unknown,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
            Self::Timeout => "timeout",
            Self::Cancelling => "cancelling",
            Self::Unknown => "unknown",
        }
    }

    /// Done, error and cancelled end a wait.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Director task as returned by `GET /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub state: TaskState,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// Filters for `GET /tasks`.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub state: Option<String>,
    pub deployment: Option<String>,
    pub limit: Option<u32>,
}

impl TaskFilter {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(state) = &self.state {
            query.push(("state", state.clone()));
        }
        if let Some(deployment) = &self.deployment {
            query.push(("deployment", deployment.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

/// Which task log `GET /tasks/{id}/output` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskOutput {
    #[default]
    Result,
    Event,
    Debug,
}

impl TaskOutput {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Result => "result",
            Self::Event => "event",
            Self::Debug => "debug",
        }
    }
}

/// Target state for `PUT /deployments/{d}/jobs/{job}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Started,
    Stopped,
    Restart,
    Recreate,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Restart => "restart",
            Self::Recreate => "recreate",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameVersion {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub name: String,
    pub cloud_config: Option<String>,
    pub releases: Vec<NameVersion>,
    pub stemcells: Vec<NameVersion>,
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vm {
    pub agent_id: String,
    pub cid: Option<String>,
    pub job: String,
    pub index: Option<u32>,
    pub id: String,
    pub az: Option<String>,
    pub ips: Vec<String>,
    pub vm_type: Option<String>,
    pub process_state: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Process {
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub agent_id: Option<String>,
    pub cid: Option<String>,
    #[serde(alias = "job")]
    pub job_name: String,
    pub index: Option<u32>,
    pub id: String,
    pub az: Option<String>,
    pub ips: Vec<String>,
    pub vm_type: Option<String>,
    pub process_state: Option<String>,
    pub state: Option<String>,
    pub bootstrap: bool,
    pub disk_cid: Option<String>,
    pub expects_vm: bool,
    pub processes: Vec<Process>,
    pub vitals: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemcellDeployment {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stemcell {
    pub name: String,
    pub operating_system: String,
    pub version: String,
    pub cid: String,
    pub cpi: Option<String>,
    pub deployments: Vec<StemcellDeployment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseVersion {
    pub version: String,
    pub commit_hash: String,
    pub uncommitted_changes: bool,
    pub currently_deployed: bool,
    pub job_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub name: String,
    pub release_versions: Vec<ReleaseVersion>,
}

/// A versioned config (cloud, runtime or cpi).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub config_type: String,
    pub content: String,
    pub created_at: String,
    pub team: Option<String>,
}

/// The config families served by `GET /configs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigType {
    Cloud,
    Runtime,
    Cpi,
}

impl ConfigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Runtime => "runtime",
            Self::Cpi => "cpi",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lock {
    #[serde(rename = "type")]
    pub lock_type: String,
    pub resource: Vec<String>,
    pub timeout: String,
    pub task_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskState::Done.is_terminal());
        assert!(TaskState::Error.is_terminal());
        assert!(TaskState::Cancelled.is_terminal());
        assert!(!TaskState::Queued.is_terminal());
        assert!(!TaskState::Processing.is_terminal());
        assert!(!TaskState::Cancelling.is_terminal());
    }

    #[test]
    fn unknown_state_decodes() {
        let task: Task = serde_json::from_str(r#"{"id":7,"state":"paused"}"#).unwrap();
        assert_eq!(task.state, TaskState::Unknown);
        assert_eq!(task.description, "");
    }

    #[test]
    fn instance_accepts_job_or_job_name() {
        let a: Instance = serde_json::from_str(r#"{"job_name":"diego_cell","index":0}"#).unwrap();
        let b: Instance = serde_json::from_str(r#"{"job":"diego_cell","index":1}"#).unwrap();
        assert_eq!(a.job_name, "diego_cell");
        assert_eq!(b.job_name, "diego_cell");
    }

    #[test]
    fn task_filter_query() {
        let filter = TaskFilter {
            state: Some("processing".into()),
            deployment: None,
            limit: Some(5),
        };
        assert_eq!(
            filter.query(),
            vec![("state", "processing".to_string()), ("limit", "5".to_string())]
        );
    }
}
