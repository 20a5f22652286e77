use axum::{
    http::{Method, StatusCode, Uri},
    routing::get,
    Router,
};

use crate::http::error::{AppError, HttpException};
use crate::http::server::AppState;

/// Application routes, without the observability pipeline.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_hello))
        .route("/exception", get(throw_exception))
}

pub async fn get_hello() -> &'static str {
    "Hello World!"
}

/// Always fails; exercises the exception filters.
pub async fn throw_exception() -> Result<&'static str, AppError> {
    Err(HttpException::new(StatusCode::INTERNAL_SERVER_ERROR, "123").into())
}

pub async fn not_found(method: Method, uri: Uri) -> AppError {
    HttpException::not_found(format!("Cannot {} {}", method, uri.path())).into()
}
