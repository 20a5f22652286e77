//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer order)
//!     → filters.rs (exception boundary: faults → one sanitized response)
//!     → interceptor.rs (latency + bodies → one info line per success)
//!     → handlers.rs (application routes)
//!     → error.rs (AppError tagged onto the response on failure)
//! ```

pub mod error;
pub mod filters;
pub mod handlers;
pub mod interceptor;
pub mod server;

pub use error::{AppError, HttpException};
pub use filters::{ExceptionChain, ExceptionFilter, RequestInfo};
pub use server::{with_pipeline, AppState, HttpServer};
