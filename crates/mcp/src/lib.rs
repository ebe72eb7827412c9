//! MCP (Model Context Protocol) server exposing the BOSH Director as tools.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use auth::Resolver;
//! use confirm::TokenStore;
//! use mcp::BoshTools;
//! use operations::Operations;
//! use policy::Policy;
//! use rmcp::ServiceExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = Policy::default();
//! let tokens = Arc::new(TokenStore::new(policy.token_ttl()));
//! let resolver = Arc::new(Resolver::standard(None, Duration::from_secs(300)));
//! let tools = BoshTools::new(Operations::new(resolver, policy, tokens));
//!
//! tools.serve(rmcp::transport::stdio()).await?.waiting().await?;
//! # Ok(())
//! # }
//! ```

mod params;
mod tools;

pub use params::{
    DeleteDeploymentInput, DeploymentInput, EnvironmentInput, Index, JobInput, TaskInput,
    TaskWaitInput, TasksInput,
};
pub use tools::{BoshTools, MAX_OUTPUT_SIZE};
