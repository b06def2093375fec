//! tailgate server binary.
//!
//! Loads the YAML config (`TAILGATE_CONFIG`, default `tailgate.yaml`), starts the agent and
//! drains on Ctrl-C.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use tailgate_core::error::Result;
use tailgate_server::agent::{Agent, AgentConfig};
use tailgate_server::config;

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "tailgate failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let agent = Agent::start(AgentConfig::from_gateway_config(&cfg)?).await?;
    tracing::info!(config = %path, rpc = %agent.local_addr(), "tailgate started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "signal handler failed; shutting down");
    }
    agent.shutdown().await;
    Ok(())
}
