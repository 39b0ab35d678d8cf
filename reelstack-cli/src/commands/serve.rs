//! HTTP server command for the reelstack API

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use reelstack_core::AppConfig;
use reelstack_server::http::{run_server, ServerConfig};
use reelstack_server::AppState;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if args.database_url.is_some() {
        config.database_url = args.database_url;
    }
    if config.database_url.is_none() {
        // Not fatal here: the connection cache reports it on first use.
        // Warn loudly anyway, since every data route will fail.
        tracing::warn!("DATABASE_URL not set; data routes will return errors");
    }

    tracing::info!("Starting reelstack server on {}", args.bind);

    let state = AppState::from_config(&config);
    let server_config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Run server (blocks until shutdown)
    run_server(state, server_config).await.context("Server error")?;

    Ok(())
}
