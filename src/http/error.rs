//! Request faults.
//!
//! Handlers return [`AppError`]. Converting it into a response does not
//! produce the client body: it yields a placeholder tagged with a [`Fault`]
//! extension, and the exception boundary replaces it with the response
//! chosen by the filter chain.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

/// An error that deliberately carries a client-facing status and message.
pub struct HttpException {
    status: StatusCode,
    message: String,
    backtrace: Backtrace,
}

impl HttpException {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            backtrace: Backtrace::force_capture(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message followed by the captured call stack.
    pub fn stack(&self) -> String {
        format!("HttpException: {}\n{}", self.message, self.backtrace)
    }
}

impl fmt::Debug for HttpException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpException")
            .field("status", &self.status)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for HttpException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpException {}

/// Any fault escaping a handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client-intended error with its own status.
    #[error(transparent)]
    Http(#[from] HttpException),

    /// Anything else; its message never reaches the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Http(e) => e.status(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn stack(&self) -> Option<String> {
        match self {
            AppError::Http(e) => Some(e.stack()),
            AppError::Internal(e) => Some(format!("{:?}", e)),
        }
    }
}

/// Response extension marking a response as a placeholder for a fault.
#[derive(Debug, Clone)]
pub struct Fault(pub Arc<AppError>);

impl Fault {
    pub fn error(&self) -> &AppError {
        &self.0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(Fault(Arc::new(self)));
        response
    }
}

impl IntoResponse for HttpException {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Look up the fault carried by a response, if any.
pub fn fault_of(response: &Response) -> Option<Fault> {
    response.extensions().get::<Fault>().cloned()
}
