//! Request/response logging interceptor.
//!
//! # Responsibilities
//! - Record method, URL, request body and start time on entry
//! - On normal completion, log one `info` line with bodies and latency
//! - Leave faulted responses to the exception boundary
//!
//! # Design Decisions
//! - Bodies are buffered so the line is written only once the response is fully known
//! - Request bodies above [`MAX_BODY_BYTES`] are rejected with 413
//! - Logging never alters the response

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use std::any::Any;
use std::time::Instant;

use crate::http::error::{fault_of, AppError, HttpException};
use crate::http::filters::original_url;
use crate::http::server::AppState;

/// Largest request body the interceptor will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// One completed request, ready to be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestObservation {
    pub method: String,
    pub url: String,
    pub body: String,
    pub response: String,
    pub delay_ms: u128,
}

impl RequestObservation {
    pub fn message(&self) -> String {
        format!(
            "HTTP Request: method={}, url={}, body={}, response={}, delay={}ms",
            self.method, self.url, self.body, self.response, self.delay_ms
        )
    }
}

/// Render a body as JSON text for the log line.
///
/// JSON bodies are compacted, other bytes become a JSON string, and an
/// empty body is rendered as `empty`.
pub fn body_as_json(bytes: &[u8], empty: &str) -> String {
    if bytes.is_empty() {
        return empty.to_string();
    }
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => value.to_string(),
        Err(_) => serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()).to_string(),
    }
}

fn declared_length<B>(request: &Request<B>) -> Option<usize> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Whether buffering failed because the body outgrew the limit.
fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Middleware logging every successfully completed request.
pub async fn logging_interceptor(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let url = original_url(&request);

    if declared_length(&request).is_some_and(|len| len > MAX_BODY_BYTES) {
        return HttpException::payload_too_large().into_response();
    }

    let (parts, body) = request.into_parts();
    let request_bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) if exceeded_limit(&e) => {
            return HttpException::payload_too_large().into_response();
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to buffer request body");
            return HttpException::bad_request("Failed to read request body").into_response();
        }
    };
    let request = Request::from_parts(parts, Body::from(request_bytes.clone()));

    let response = next.run(request).await;
    if fault_of(&response).is_some() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let response_bytes: Bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::Internal(anyhow::Error::new(e).context("response body failed"))
                .into_response();
        }
    };

    let observation = RequestObservation {
        method,
        url,
        body: body_as_json(&request_bytes, "{}"),
        response: body_as_json(&response_bytes, "null"),
        delay_ms: start.elapsed().as_millis(),
    };
    state.logger.info(observation.message());

    Response::from_parts(parts, Body::from(response_bytes))
}

/// Panic handler turning a handler panic into an internal fault.
pub fn panic_fault(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::fault_of;
    use axum::http::StatusCode;

    #[test]
    fn test_body_as_json() {
        assert_eq!(body_as_json(b"", "{}"), "{}");
        assert_eq!(body_as_json(b"", "null"), "null");
        assert_eq!(body_as_json(b"Hello World!", "null"), r#""Hello World!""#);
        assert_eq!(body_as_json(b"{ \"a\" : 1 }", "{}"), r#"{"a":1}"#);
        assert_eq!(body_as_json(b"42", "{}"), "42");
    }

    #[test]
    fn test_observation_message() {
        let observation = RequestObservation {
            method: "GET".into(),
            url: "/".into(),
            body: "{}".into(),
            response: r#""Hello World!""#.into(),
            delay_ms: 3,
        };
        assert_eq!(
            observation.message(),
            r#"HTTP Request: method=GET, url=/, body={}, response="Hello World!", delay=3ms"#
        );
    }

    #[tokio::test]
    async fn test_exceeded_limit_detects_length_error() {
        let err = axum::body::to_bytes(Body::from(vec![0u8; 16]), 8)
            .await
            .unwrap_err();
        assert!(exceeded_limit(&err));

        let other = axum::Error::new(std::io::Error::new(std::io::ErrorKind::Other, "reset"));
        assert!(!exceeded_limit(&other));
    }

    #[test]
    fn test_panic_fault_is_internal() {
        let response = panic_fault(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let fault = fault_of(&response).unwrap();
        assert!(matches!(fault.error(), AppError::Internal(_)));
        assert!(fault.error().to_string().contains("boom"));
    }
}
