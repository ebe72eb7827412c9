//! MCP tools over the BOSH Director.
//!
//! Read tools pass straight through to the Director. The state-changing
//! tools (`bosh_delete_deployment`, `bosh_recreate`, `bosh_stop`,
//! `bosh_start`, `bosh_restart`) go through the confirmation flow: the
//! first call may return a `confirmation_token` instead of acting, and the
//! caller repeats the call with `confirm` set to it.

use std::time::Duration;

use director::{TaskFilter, TaskOutput};
use operations::{Operations, Target};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde::Serialize;

use crate::params::{
    DeleteDeploymentInput, DeploymentInput, EnvironmentInput, JobInput, TaskInput, TaskWaitInput,
    TasksInput,
};

/// Maximum tool output size (1MB). Debug task logs can exceed it.
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// MCP server handler exposing the BOSH tools.
#[derive(Clone)]
pub struct BoshTools {
    ops: Operations,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for BoshTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoshTools").field("ops", &self.ops).finish()
    }
}

impl BoshTools {
    pub fn new(ops: Operations) -> Self {
        Self {
            ops,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl BoshTools {
    #[tool(description = "List deployments with their releases and stemcells.")]
    async fn bosh_deployments(&self, params: Parameters<EnvironmentInput>) -> Result<String, String> {
        let input = params.0;
        render(self.ops.deployments(input.environment.as_deref()).await)
    }

    #[tool(description = "List VMs of a deployment with their job, index, IPs and process state.")]
    async fn bosh_vms(&self, params: Parameters<DeploymentInput>) -> Result<String, String> {
        let input = params.0;
        render(
            self.ops
                .vms(&input.deployment, input.environment.as_deref())
                .await,
        )
    }

    #[tool(description = "List instances of a deployment including processes and vitals.")]
    async fn bosh_instances(&self, params: Parameters<DeploymentInput>) -> Result<String, String> {
        let input = params.0;
        render(
            self.ops
                .instances(&input.deployment, input.environment.as_deref())
                .await,
        )
    }

    #[tool(description = "List recent Director tasks, optionally filtered by state or deployment.")]
    async fn bosh_tasks(&self, params: Parameters<TasksInput>) -> Result<String, String> {
        let input = params.0;
        let filter = TaskFilter {
            state: input.state,
            deployment: input.deployment,
            limit: input.limit,
        };
        render(self.ops.tasks(&filter, input.environment.as_deref()).await)
    }

    #[tool(description = "Show one task. Set output to result, event or debug to include its log.")]
    async fn bosh_task(&self, params: Parameters<TaskInput>) -> Result<String, String> {
        let input = params.0;
        let output = input.output.as_deref().map(parse_output).transpose()?;
        render(
            self.ops
                .task(input.id, output, input.environment.as_deref())
                .await,
        )
    }

    #[tool(description = "Wait for a task to finish (done, error or cancelled) and return it \
        with its result. Fails with the last seen state on timeout.")]
    async fn bosh_task_wait(&self, params: Parameters<TaskWaitInput>) -> Result<String, String> {
        let input = params.0;
        let timeout = input.timeout.map(Duration::from_secs);
        render(
            self.ops
                .task_wait(input.id, timeout, input.environment.as_deref())
                .await,
        )
    }

    #[tool(description = "List uploaded stemcells and the deployments using them.")]
    async fn bosh_stemcells(&self, params: Parameters<EnvironmentInput>) -> Result<String, String> {
        render(self.ops.stemcells(params.0.environment.as_deref()).await)
    }

    #[tool(description = "List uploaded releases and their versions.")]
    async fn bosh_releases(&self, params: Parameters<EnvironmentInput>) -> Result<String, String> {
        render(self.ops.releases(params.0.environment.as_deref()).await)
    }

    #[tool(description = "Show the latest cloud config.")]
    async fn bosh_cloud_config(
        &self,
        params: Parameters<EnvironmentInput>,
    ) -> Result<String, String> {
        render(self.ops.cloud_config(params.0.environment.as_deref()).await)
    }

    #[tool(description = "Show the latest runtime configs.")]
    async fn bosh_runtime_config(
        &self,
        params: Parameters<EnvironmentInput>,
    ) -> Result<String, String> {
        render(self.ops.runtime_configs(params.0.environment.as_deref()).await)
    }

    #[tool(description = "Show the latest CPI config.")]
    async fn bosh_cpi_config(&self, params: Parameters<EnvironmentInput>) -> Result<String, String> {
        render(self.ops.cpi_config(params.0.environment.as_deref()).await)
    }

    #[tool(description = "List variable names and ids for a deployment (no values).")]
    async fn bosh_variables(&self, params: Parameters<DeploymentInput>) -> Result<String, String> {
        let input = params.0;
        render(
            self.ops
                .variables(&input.deployment, input.environment.as_deref())
                .await,
        )
    }

    #[tool(description = "List current Director locks.")]
    async fn bosh_locks(&self, params: Parameters<EnvironmentInput>) -> Result<String, String> {
        render(self.ops.locks(params.0.environment.as_deref()).await)
    }

    #[tool(description = "Delete a deployment. Requires confirmation: the first call returns a \
        confirmation_token; call again with confirm set to it.")]
    async fn bosh_delete_deployment(
        &self,
        params: Parameters<DeleteDeploymentInput>,
    ) -> Result<String, String> {
        let input = params.0;
        render(
            self.ops
                .delete_deployment(
                    &input.deployment,
                    input.force,
                    input.environment.as_deref(),
                    input.confirm.as_deref(),
                )
                .await,
        )
    }

    #[tool(description = "Recreate VMs of a deployment, job or instance. Requires confirmation \
        by default.")]
    async fn bosh_recreate(&self, params: Parameters<JobInput>) -> Result<String, String> {
        let (target, environment, confirm) = job_request(params.0);
        render(
            self.ops
                .recreate(target, environment.as_deref(), confirm.as_deref())
                .await,
        )
    }

    #[tool(description = "Stop jobs of a deployment, job or instance. Requires confirmation by \
        default.")]
    async fn bosh_stop(&self, params: Parameters<JobInput>) -> Result<String, String> {
        let (target, environment, confirm) = job_request(params.0);
        render(
            self.ops
                .stop(target, environment.as_deref(), confirm.as_deref())
                .await,
        )
    }

    #[tool(description = "Start stopped jobs of a deployment, job or instance.")]
    async fn bosh_start(&self, params: Parameters<JobInput>) -> Result<String, String> {
        let (target, environment, confirm) = job_request(params.0);
        render(
            self.ops
                .start(target, environment.as_deref(), confirm.as_deref())
                .await,
        )
    }

    #[tool(description = "Restart jobs of a deployment, job or instance.")]
    async fn bosh_restart(&self, params: Parameters<JobInput>) -> Result<String, String> {
        let (target, environment, confirm) = job_request(params.0);
        render(
            self.ops
                .restart(target, environment.as_deref(), confirm.as_deref())
                .await,
        )
    }
}

#[tool_handler]
impl ServerHandler for BoshTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "BOSH Director tools. Read tools are safe to call freely. \
                 Destructive tools return a confirmation_token on the first call; \
                 repeat the call with confirm set to that token to proceed, then \
                 follow the returned task_id with bosh_task_wait."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

fn job_request(input: JobInput) -> (Target, Option<String>, Option<String>) {
    let target = Target {
        deployment: input.deployment,
        job: input.job,
        index: input.index.map(|i| i.into_string()),
    };
    (target, input.environment, input.confirm)
}

fn parse_output(kind: &str) -> Result<TaskOutput, String> {
    match kind {
        "result" => Ok(TaskOutput::Result),
        "event" => Ok(TaskOutput::Event),
        "debug" => Ok(TaskOutput::Debug),
        other => Err(format!(
            "unknown output type '{other}', expected result, event or debug"
        )),
    }
}

/// JSON for `Ok`, the error message for `Err`.
fn render<T: Serialize>(result: operations::Result<T>) -> Result<String, String> {
    match result {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| format!("Serialization error: {e}"))?;
            Ok(truncate(text))
        }
        Err(e) => {
            tracing::debug!(error = %e, "tool call failed");
            Err(e.to_string())
        }
    }
}

fn truncate(mut text: String) -> String {
    if text.len() <= MAX_OUTPUT_SIZE {
        return text;
    }
    let mut end = MAX_OUTPUT_SIZE;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let total = text.len();
    text.truncate(end);
    text.push_str(&format!("\n... [truncated, {total} bytes total]"));
    text
}
