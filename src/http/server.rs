//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the application handlers
//! - Wrap it in the observability pipeline (boundary, interceptor, panic catcher)
//! - Bind the server to a listener and shut down on signal

use axum::{middleware, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::filters::{exception_boundary, ExceptionChain};
use crate::http::handlers;
use crate::http::interceptor::{logging_interceptor, panic_fault};
use crate::observability::Logger;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub logger: Arc<Logger>,
    pub exceptions: Arc<ExceptionChain>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, logger: Arc<Logger>) -> Self {
        let exceptions = Arc::new(ExceptionChain::new(config.node_env, logger.clone()));
        Self {
            config,
            logger,
            exceptions,
        }
    }
}

/// Wrap `routes` in the request pipeline.
///
/// Outermost first: trace span → exception boundary → logging interceptor →
/// panic catcher → handler. Unmatched paths become 404 faults.
pub fn with_pipeline(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), exception_boundary))
                .layer(middleware::from_fn_with_state(state.clone(), logging_interceptor))
                .layer(CatchPanicLayer::custom(panic_fault)),
        )
        .with_state(state)
}

/// HTTP server for the application.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = with_pipeline(handlers::routes(), state.clone());
        Self { router, state }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            node_env = %self.state.config.node_env,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
