mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use auth::Resolver;
use clap::Parser;
use confirm::TokenStore;
use mcp::BoshTools;
use operations::Operations;
use rmcp::ServiceExt;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "bosh-mcp-server")]
#[command(about = "MCP server for the BOSH Director", long_about = None)]
#[command(version)]
struct Cli {
    /// Server config file (TOML)
    #[arg(long, env = "BOSH_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// BOSH CLI config with named environments [default: ~/.bosh/config]
    #[arg(long, env = "BOSH_CONFIG")]
    bosh_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let tokens = Arc::new(TokenStore::new(config.policy.token_ttl()));
    let resolver = Arc::new(Resolver::standard(
        cli.bosh_config,
        config.credentials.om_cache_ttl(),
    ));
    tracing::info!(?resolver, "credential chain ready");

    let ops = Operations::new(resolver, config.policy.clone(), tokens.clone())
        .with_wait_settings(config.tasks.wait_settings());
    let sweeper = spawn_token_sweeper(tokens);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        token_ttl = config.policy.token_ttl,
        "bosh-mcp-server listening on stdio"
    );

    let service = BoshTools::new(ops)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;
    let reason = service
        .waiting()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;

    sweeper.abort();
    tracing::info!(?reason, "shutting down");
    Ok(())
}

/// Logs go to stderr; stdout carries the MCP transport.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Periodically drop expired confirmation tokens.
fn spawn_token_sweeper(tokens: Arc<TokenStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = tokens.cleanup();
            if removed > 0 {
                tracing::debug!(removed, "swept expired confirmation tokens");
            }
        }
    })
}
