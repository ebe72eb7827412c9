//! Tool-level handlers over the Director client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use auth::Resolver;
use confirm::TokenStore;
use director::{
    Client, Config, Deployment, Instance, JobState, Lock, Release, Stemcell, Task,
    TaskFilter, TaskOutput, TaskState, Variable, Vm,
};
use policy::Policy;
use serde::Serialize;

use crate::{ConfirmationRequired, Error, Operation, Outcome, Result, Submitted, Target};

/// How `task_wait` polls when the caller gives no timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: director::DEFAULT_WAIT_TIMEOUT,
            poll_interval: director::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A task together with its result log, when one was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    #[serde(flatten)]
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Every operation the server exposes, sharing one resolver, policy and
/// token store.
#[derive(Debug, Clone)]
pub struct Operations {
    resolver: Arc<Resolver>,
    policy: Arc<Policy>,
    tokens: Arc<TokenStore>,
    wait: WaitSettings,
}

impl Operations {
    pub fn new(resolver: Arc<Resolver>, policy: Policy, tokens: Arc<TokenStore>) -> Self {
        Self {
            resolver,
            policy: Arc::new(policy),
            tokens,
            wait: WaitSettings::default(),
        }
    }

    pub fn with_wait_settings(mut self, wait: WaitSettings) -> Self {
        self.wait = wait;
        self
    }

    /// A Director client for `environment` (or whatever the chain finds).
    pub async fn client(&self, environment: Option<&str>) -> Result<Client> {
        let creds = self.resolver.resolve(environment).await?;
        Ok(Client::new(&creds).await?)
    }

    /// Policy check, then mint-or-validate, then run `execute`.
    ///
    /// A blocked operation is refused before any token is looked at. When
    /// confirmation is required and no token is given, a token is minted and
    /// returned and `execute` is never called.
    async fn gated<F, Fut>(
        &self,
        operation: Operation,
        target: Target,
        environment: Option<&str>,
        confirm: Option<&str>,
        execute: F,
    ) -> Result<Outcome>
    where
        F: FnOnce(Client, Target) -> Fut,
        Fut: Future<Output = director::Result<u64>>,
    {
        let target = target.normalized()?;
        let op = operation.as_str();
        let resource = target.resource();

        if self.policy.is_blocked(op) {
            tracing::warn!(operation = op, %resource, "operation blocked by policy");
            return Err(Error::Blocked(op));
        }

        if self.policy.requires_confirmation(op) {
            match confirm.map(str::trim).filter(|t| !t.is_empty()) {
                None => return self.mint(operation, target),
                Some(token) => {
                    if !self.tokens.validate(token, op, &resource) {
                        tracing::warn!(operation = op, %resource, "confirmation token rejected");
                        return Err(Error::InvalidToken);
                    }
                    tracing::info!(operation = op, %resource, "confirmation token accepted");
                }
            }
        }

        let client = self.client(environment).await?;
        let task_id = execute(client, target.clone()).await?;
        tracing::info!(operation = op, %resource, task_id, "operation submitted");

        Ok(Outcome::Submitted(Submitted {
            task_id,
            state: TaskState::Queued.as_str(),
            operation: op,
            message: format!(
                "{op} on {resource} queued as task {task_id}; use bosh_task_wait to follow it"
            ),
            deployment: target.deployment,
            job: target.job,
            index: target.index,
        }))
    }

    fn mint(&self, operation: Operation, target: Target) -> Result<Outcome> {
        let op = operation.as_str();
        let resource = target.resource();
        let token = self.tokens.generate(op, &resource)?;
        let ttl = self.tokens.ttl().as_secs();
        tracing::info!(operation = op, %resource, "confirmation required");

        Ok(Outcome::ConfirmationRequired(ConfirmationRequired {
            requires_confirmation: true,
            confirmation_token: token,
            operation: op,
            message: format!(
                "{op} on {resource} needs confirmation; call again with confirm set to \
                 confirmation_token within {ttl} seconds"
            ),
            deployment: target.deployment,
            job: target.job,
            index: target.index,
            expires_in_seconds: ttl,
        }))
    }

    // --- Gated operations ---

    pub async fn delete_deployment(
        &self,
        deployment: &str,
        force: bool,
        environment: Option<&str>,
        confirm: Option<&str>,
    ) -> Result<Outcome> {
        self.gated(
            Operation::DeleteDeployment,
            Target::deployment(deployment),
            environment,
            confirm,
            move |client, target| async move {
                client.delete_deployment(&target.deployment, force).await
            },
        )
        .await
    }

    /// Recreate, stop, start or restart jobs of a deployment.
    pub async fn change_job_state(
        &self,
        state: JobState,
        target: Target,
        environment: Option<&str>,
        confirm: Option<&str>,
    ) -> Result<Outcome> {
        self.gated(
            Operation::for_job_state(state),
            target,
            environment,
            confirm,
            move |client, target| async move {
                client
                    .change_job_state(
                        &target.deployment,
                        target.job.as_deref(),
                        target.index.as_deref(),
                        state,
                    )
                    .await
            },
        )
        .await
    }

    pub async fn recreate(
        &self,
        target: Target,
        environment: Option<&str>,
        confirm: Option<&str>,
    ) -> Result<Outcome> {
        self.change_job_state(JobState::Recreate, target, environment, confirm)
            .await
    }

    pub async fn stop(
        &self,
        target: Target,
        environment: Option<&str>,
        confirm: Option<&str>,
    ) -> Result<Outcome> {
        self.change_job_state(JobState::Stopped, target, environment, confirm)
            .await
    }

    pub async fn start(
        &self,
        target: Target,
        environment: Option<&str>,
        confirm: Option<&str>,
    ) -> Result<Outcome> {
        self.change_job_state(JobState::Started, target, environment, confirm)
            .await
    }

    pub async fn restart(
        &self,
        target: Target,
        environment: Option<&str>,
        confirm: Option<&str>,
    ) -> Result<Outcome> {
        self.change_job_state(JobState::Restart, target, environment, confirm)
            .await
    }

    // --- Reads ---

    pub async fn deployments(&self, environment: Option<&str>) -> Result<Vec<Deployment>> {
        Ok(self.client(environment).await?.list_deployments().await?)
    }

    pub async fn vms(&self, deployment: &str, environment: Option<&str>) -> Result<Vec<Vm>> {
        let deployment = required("deployment", deployment)?;
        Ok(self.client(environment).await?.list_vms(deployment).await?)
    }

    pub async fn instances(
        &self,
        deployment: &str,
        environment: Option<&str>,
    ) -> Result<Vec<Instance>> {
        let deployment = required("deployment", deployment)?;
        Ok(self
            .client(environment)
            .await?
            .list_instances(deployment)
            .await?)
    }

    pub async fn tasks(&self, filter: &TaskFilter, environment: Option<&str>) -> Result<Vec<Task>> {
        Ok(self.client(environment).await?.list_tasks(filter).await?)
    }

    /// One task, plus the requested log when `output` is given.
    pub async fn task(
        &self,
        id: u64,
        output: Option<TaskOutput>,
        environment: Option<&str>,
    ) -> Result<TaskReport> {
        let client = self.client(environment).await?;
        let task = client.get_task(id).await?;
        let output = match output {
            Some(kind) => Some(client.get_task_output(id, kind).await?),
            None => None,
        };
        Ok(TaskReport { task, output })
    }

    /// Wait for a task to finish; done and errored tasks come back with
    /// their result log when it can be fetched.
    pub async fn task_wait(
        &self,
        id: u64,
        timeout: Option<Duration>,
        environment: Option<&str>,
    ) -> Result<TaskReport> {
        let client = self.client(environment).await?;
        let timeout = timeout.unwrap_or(self.wait.timeout);
        let task = client
            .wait_for_task(id, timeout, self.wait.poll_interval)
            .await?;

        let output = match task.state {
            TaskState::Done | TaskState::Error => {
                match client.get_task_output(id, TaskOutput::Result).await {
                    Ok(output) => Some(output),
                    Err(e) => {
                        tracing::warn!(task_id = id, error = %e, "failed to fetch task result");
                        None
                    }
                }
            }
            _ => None,
        };
        Ok(TaskReport { task, output })
    }

    pub async fn stemcells(&self, environment: Option<&str>) -> Result<Vec<Stemcell>> {
        Ok(self.client(environment).await?.list_stemcells().await?)
    }

    pub async fn releases(&self, environment: Option<&str>) -> Result<Vec<Release>> {
        Ok(self.client(environment).await?.list_releases().await?)
    }

    pub async fn cloud_config(&self, environment: Option<&str>) -> Result<Vec<Config>> {
        Ok(self.client(environment).await?.get_cloud_config().await?)
    }

    pub async fn runtime_configs(&self, environment: Option<&str>) -> Result<Vec<Config>> {
        Ok(self.client(environment).await?.get_runtime_configs().await?)
    }

    pub async fn cpi_config(&self, environment: Option<&str>) -> Result<Vec<Config>> {
        Ok(self.client(environment).await?.get_cpi_config().await?)
    }

    pub async fn variables(
        &self,
        deployment: &str,
        environment: Option<&str>,
    ) -> Result<Vec<Variable>> {
        let deployment = required("deployment", deployment)?;
        Ok(self
            .client(environment)
            .await?
            .list_variables(deployment)
            .await?)
    }

    pub async fn locks(&self, environment: Option<&str>) -> Result<Vec<Lock>> {
        Ok(self.client(environment).await?.list_locks().await?)
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingField(field));
    }
    Ok(value)
}
