//! Authenticated HTTP client for the Director REST API.

use std::path::PathBuf;
use std::time::Duration;

use auth::Credentials;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    Config, ConfigType, Deployment, Error, Instance, JobState, Lock, Release, Result, Stemcell,
    Task, TaskFilter, TaskOutput, Variable, Vm,
};

/// Port the Director listens on when an address carries none.
pub const DEFAULT_PORT: u16 = 25555;

/// Upper bound on a single request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for one Director, bound to one set of credentials.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
    client: String,
    client_secret: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base", &self.base.as_str())
            .field("client", &self.client)
            .finish()
    }
}

impl Client {
    /// Build a client from resolved credentials.
    ///
    /// Without a CA certificate TLS verification is disabled. With one
    /// (PEM content or a path to a PEM file) only that CA is trusted.
    pub async fn new(creds: &Credentials) -> Result<Self> {
        let base = base_url(&creds.environment)?;

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT);

        builder = match &creds.ca_cert {
            Some(ca) => {
                let pem = load_ca_cert(ca).await?;
                let cert = reqwest::Certificate::from_pem(&pem)?;
                builder
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(cert)
            }
            None => builder.danger_accept_invalid_certs(true),
        };

        Ok(Self {
            http: builder.build()?,
            base,
            client: creds.client.clone(),
            client_secret: creds.client_secret.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.client, Some(&self.client_secret))
            .header(ACCEPT, "application/json")
    }

    async fn get_text(&self, segments: &[&str], query: &[(&str, String)]) -> Result<String> {
        let url = self.url(segments)?;
        tracing::debug!(%url, "GET");

        let response = self.request(Method::GET, url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() >= 400 {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get_text(segments, query).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Issue a state-changing request and return the id of the task it queued.
    async fn submit(&self, request: RequestBuilder) -> Result<u64> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::FOUND || status == StatusCode::ACCEPTED {
            let location = response
                .headers()
                .get(LOCATION)
                .ok_or(Error::TaskLocationMissing)?
                .to_str()
                .map_err(|_| Error::TaskLocationMalformed("<non-ascii header>".to_string()))?;
            let id = task_id_from_location(location)?;
            tracing::info!(task_id = id, "director accepted task");
            return Ok(id);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
        if status.as_u16() >= 400 {
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            })
        }
    }

    // --- Reads ---

    pub async fn list_deployments(&self) -> Result<Vec<Deployment>> {
        self.get_json(&["deployments"], &[]).await
    }

    pub async fn list_vms(&self, deployment: &str) -> Result<Vec<Vm>> {
        self.get_json(&["deployments", deployment, "vms"], &[]).await
    }

    /// Instances with process details (`format=full`).
    pub async fn list_instances(&self, deployment: &str) -> Result<Vec<Instance>> {
        self.get_json(
            &["deployments", deployment, "instances"],
            &[("format", "full".to_string())],
        )
        .await
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.get_json(&["tasks"], &filter.query()).await
    }

    pub async fn get_task(&self, id: u64) -> Result<Task> {
        self.get_json(&["tasks", &id.to_string()], &[]).await
    }

    /// Raw task log of the requested kind.
    pub async fn get_task_output(&self, id: u64, output: TaskOutput) -> Result<String> {
        self.get_text(
            &["tasks", &id.to_string(), "output"],
            &[("type", output.as_str().to_string())],
        )
        .await
    }

    pub async fn list_stemcells(&self) -> Result<Vec<Stemcell>> {
        self.get_json(&["stemcells"], &[]).await
    }

    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        self.get_json(&["releases"], &[]).await
    }

    /// Latest configs of one type.
    pub async fn get_configs(&self, config_type: ConfigType) -> Result<Vec<Config>> {
        self.get_json(
            &["configs"],
            &[
                ("type", config_type.as_str().to_string()),
                ("latest", "true".to_string()),
            ],
        )
        .await
    }

    pub async fn get_cloud_config(&self) -> Result<Vec<Config>> {
        self.get_configs(ConfigType::Cloud).await
    }

    pub async fn get_runtime_configs(&self) -> Result<Vec<Config>> {
        self.get_configs(ConfigType::Runtime).await
    }

    pub async fn get_cpi_config(&self) -> Result<Vec<Config>> {
        self.get_configs(ConfigType::Cpi).await
    }

    pub async fn list_variables(&self, deployment: &str) -> Result<Vec<Variable>> {
        self.get_json(&["deployments", deployment, "variables"], &[])
            .await
    }

    pub async fn list_locks(&self) -> Result<Vec<Lock>> {
        self.get_json(&["locks"], &[]).await
    }

    // --- State changes (each returns a task id) ---

    pub async fn delete_deployment(&self, deployment: &str, force: bool) -> Result<u64> {
        let url = self.url(&["deployments", deployment])?;
        let mut request = self.request(Method::DELETE, url);
        if force {
            request = request.query(&[("force", "true")]);
        }
        self.submit(request).await
    }

    /// Change the state of all jobs, one job, or one instance of a job.
    ///
    /// `index` is ignored unless `job` is given.
    pub async fn change_job_state(
        &self,
        deployment: &str,
        job: Option<&str>,
        index: Option<&str>,
        state: JobState,
    ) -> Result<u64> {
        let mut segments = vec!["deployments", deployment, "jobs", job.unwrap_or("*")];
        if let (Some(_), Some(index)) = (job, index) {
            segments.push(index);
        }

        let url = self.url(&segments)?;
        let request = self
            .request(Method::PUT, url)
            .query(&[("state", state.as_str())])
            .header(CONTENT_TYPE, "text/yaml")
            .body(Vec::new());
        self.submit(request).await
    }

    pub async fn recreate(
        &self,
        deployment: &str,
        job: Option<&str>,
        index: Option<&str>,
    ) -> Result<u64> {
        self.change_job_state(deployment, job, index, JobState::Recreate)
            .await
    }
}

/// Add a scheme (and the Director port) to bare addresses such as `10.0.0.5`.
fn base_url(environment: &str) -> Result<Url> {
    let environment = environment.trim().trim_end_matches('/');
    let invalid = || Error::InvalidUrl(environment.to_string());

    if environment.contains("://") {
        return Url::parse(environment).map_err(|_| invalid());
    }

    let mut url = Url::parse(&format!("https://{environment}")).map_err(|_| invalid())?;
    if url.port().is_none() {
        url.set_port(Some(DEFAULT_PORT)).map_err(|_| invalid())?;
    }
    Ok(url)
}

async fn load_ca_cert(ca: &str) -> Result<Vec<u8>> {
    if ca.trim_start().starts_with("-----BEGIN") {
        return Ok(ca.as_bytes().to_vec());
    }
    tokio::fs::read(ca).await.map_err(|source| Error::CaCertRead {
        path: PathBuf::from(ca),
        source,
    })
}

/// Extract the id from `/tasks/{id}` (relative or absolute).
pub(crate) fn task_id_from_location(location: &str) -> Result<u64> {
    let malformed = || Error::TaskLocationMalformed(location.to_string());

    let path = location.split(['?', '#']).next().unwrap_or_default();
    let (_, id) = path
        .trim_end_matches('/')
        .rsplit_once("/tasks/")
        .ok_or_else(malformed)?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    id.parse().map_err(|_| malformed())
}
