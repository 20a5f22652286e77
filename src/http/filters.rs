//! Exception filters.
//!
//! # Responsibilities
//! - Turn a fault into exactly one client response
//! - Report every fault once, with full detail, to the application logger
//! - Hide internal messages and stacks from clients
//!
//! # Design Decisions
//! - Filters run in order; the first one returning a response claims the fault
//! - [`AllExceptionsFilter`] is the backstop: it claims everything and is the only reporter
//! - [`HttpExceptionFilter`] answers in dev (full detail) and prod (status only), and
//!   declines in test mode so the backstop answers

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::config::NodeEnv;
use crate::http::error::{fault_of, AppError};
use crate::http::server::AppState;
use crate::observability::{ErrorPayload, Logger};

const GENERIC_MESSAGE: &str = "Internal server error";

/// Request details available to filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: Method,
    /// Path and query as received.
    pub url: String,
}

impl RequestInfo {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            url: original_url(request),
        }
    }
}

/// Path and query of the request before any nesting rewrote it.
pub fn original_url<B>(request: &Request<B>) -> String {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| request.uri());
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// A boundary handler for faults escaping request processing.
pub trait ExceptionFilter: Send + Sync {
    /// Return a response to claim the fault, `None` to pass it on.
    fn catch(&self, fault: &AppError, request: &RequestInfo) -> Option<Response>;
}

/// Answers client-intended HTTP errors according to the runtime mode.
pub struct HttpExceptionFilter {
    node_env: NodeEnv,
}

impl HttpExceptionFilter {
    pub fn new(node_env: NodeEnv) -> Self {
        Self { node_env }
    }
}

impl ExceptionFilter for HttpExceptionFilter {
    fn catch(&self, fault: &AppError, request: &RequestInfo) -> Option<Response> {
        let AppError::Http(exception) = fault else {
            return None;
        };
        let status = exception.status();

        match self.node_env {
            NodeEnv::Dev => Some(
                (
                    status,
                    Json(json!({
                        "statusCode": status.as_u16(),
                        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                        "path": request.url,
                        "message": exception.message(),
                    })),
                )
                    .into_response(),
            ),
            NodeEnv::Prod => Some(status_only(status)),
            NodeEnv::Test => None,
        }
    }
}

/// Catch-all filter: logs full detail, answers with the status code only.
pub struct AllExceptionsFilter {
    logger: Arc<Logger>,
}

impl AllExceptionsFilter {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Log the fault with method, URL, status, message and stack.
    pub fn report(&self, fault: &AppError, request: &RequestInfo) {
        let message = match fault {
            AppError::Http(e) => e.message().to_string(),
            AppError::Internal(_) => GENERIC_MESSAGE.to_string(),
        };

        self.logger.error(ErrorPayload {
            method: request.method.to_string(),
            url: request.url.clone(),
            status_code: fault.status().as_u16(),
            message,
            stack: fault.stack(),
        });
    }
}

impl ExceptionFilter for AllExceptionsFilter {
    fn catch(&self, fault: &AppError, _request: &RequestInfo) -> Option<Response> {
        Some(status_only(fault.status()))
    }
}

fn status_only(status: axum::http::StatusCode) -> Response {
    (status, Json(json!({ "statusCode": status.as_u16() }))).into_response()
}

/// Ordered filters with a catch-all backstop.
pub struct ExceptionChain {
    filters: Vec<Box<dyn ExceptionFilter>>,
    catch_all: AllExceptionsFilter,
}

impl ExceptionChain {
    /// The standard chain: HTTP filter first, then the catch-all.
    pub fn new(node_env: NodeEnv, logger: Arc<Logger>) -> Self {
        Self::with_filters(vec![Box::new(HttpExceptionFilter::new(node_env))], logger)
    }

    pub fn with_filters(filters: Vec<Box<dyn ExceptionFilter>>, logger: Arc<Logger>) -> Self {
        Self {
            filters,
            catch_all: AllExceptionsFilter::new(logger),
        }
    }

    /// Report the fault once and produce the single response for it.
    pub fn handle(&self, fault: &AppError, request: &RequestInfo) -> Response {
        self.catch_all.report(fault, request);

        self.filters
            .iter()
            .find_map(|filter| filter.catch(fault, request))
            .or_else(|| self.catch_all.catch(fault, request))
            .unwrap_or_else(|| status_only(fault.status()))
    }
}

/// Middleware replacing fault placeholders with the filter chain's response.
pub async fn exception_boundary(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let info = RequestInfo::from_request(&request);
    let response = next.run(request).await;

    match fault_of(&response) {
        Some(fault) => state.exceptions.handle(fault.error(), &info),
        None => response,
    }
}
