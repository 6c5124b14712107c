//! Warrant Node: entry point.
//!
//! Loads configuration from a TOML file, the environment and the command
//! line, then serves the delegation API until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use warrant_node::{start_api_server, AppState, WarrantConfig};

/// Warrant Node
#[derive(Parser, Debug)]
#[command(name = "warrant-node", version, about = "Warrant delegation service")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "warrant.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the API listen address.
    #[arg(long)]
    listen_addr: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Override the log format (text, json).
    #[arg(long)]
    log_format: Option<String>,

    /// Policy engine base URL.
    #[arg(long)]
    policy_url: Option<String>,

    /// Credential registry base URL.
    #[arg(long)]
    registry_url: Option<String>,

    /// Public base URL advertised in issued credentials.
    #[arg(long)]
    service_url: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration: file, then environment, then CLI
    let mut config = WarrantConfig::load(&args.config)?;
    config.apply_env(|key| std::env::var(key).ok());

    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(addr) = args.listen_addr {
        config.api.listen_addr = addr;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if let Some(url) = args.policy_url {
        config.policy.base_url = Some(url);
    }
    if let Some(url) = args.registry_url {
        config.registry.base_url = Some(url);
    }
    if let Some(url) = args.service_url {
        config.service.endpoint_base_url = Some(url);
    }

    init_tracing(&config.logging.level, &config.logging.format);

    // Handle --init flag
    if args.init {
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote config");
        return Ok(());
    }

    tracing::info!("Warrant Node v{}", env!("CARGO_PKG_VERSION"));

    let listen_addr: SocketAddr = config
        .listen_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address {}: {}", config.listen_addr(), e))?;

    let state = Arc::new(AppState::from_config(&config).await?);
    tracing::info!(
        company = %state.engine.context().company.did,
        government = %state.engine.context().government.did,
        "identity context ready"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
        tracing::info!("received shutdown signal");
    };

    let start_time = state.start_time;
    start_api_server(state, listen_addr, shutdown).await?;

    tracing::info!(
        uptime_secs = start_time.elapsed().as_secs(),
        "Warrant node exited cleanly"
    );
    Ok(())
}
