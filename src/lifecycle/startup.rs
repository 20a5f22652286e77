//! Startup orchestration.
//!
//! Fail fast: an invalid environment aborts before anything binds.

use anyhow::Context;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{load_config, AppConfig};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::Logger;

/// Startup options.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    /// Env file to read instead of `.env.<NODE_ENV>`.
    pub env_file: Option<PathBuf>,
}

/// Build shared state from a validated configuration.
pub fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let logger = Logger::from_config(&config.logging).with_context(|| {
        format!(
            "failed to prepare log directories under {}",
            config.logging.dir.display()
        )
    })?;
    Ok(AppState::new(Arc::new(config), Arc::new(logger)))
}

/// Load configuration, build the pipeline and serve until Ctrl+C.
pub async fn bootstrap(options: Bootstrap) -> anyhow::Result<()> {
    let config = load_config(options.env_file.as_deref())?;

    tracing::info!("PORT = {}", config.port);
    tracing::info!("NODE_ENV = {}", config.node_env);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let state = build_state(config)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_ctrl_c(shutdown.clone()));

    let server = HttpServer::new(state);
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
