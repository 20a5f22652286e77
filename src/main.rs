//! Web service scaffold.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ trace ─▶ exception ─▶ logging ─▶ panic ─▶ handler
//!                    span     boundary     interceptor catcher
//!                               │              │
//!                               │ error        │ info
//!                               ▼              ▼
//!                         ┌──────────────────────────┐
//!                         │  Logger (console, files) │
//!                         └──────────────────────────┘
//!
//!     Startup: env (+ .env.<NODE_ENV>) → validate → AppConfig → AppState → listen
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_scaffold::lifecycle::{bootstrap, Bootstrap};

#[derive(Parser, Debug)]
#[command(name = "app-scaffold", version, about = "Web service scaffold")]
struct Cli {
    /// Env file to load instead of `.env.<NODE_ENV>`.
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app_scaffold=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!("app-scaffold v{} starting", env!("CARGO_PKG_VERSION"));

    bootstrap(Bootstrap {
        env_file: cli.env_file,
    })
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
