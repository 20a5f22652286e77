//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! interceptor (info) ─┐
//!                     ├─→ logging.rs (Logger: one LogRecord per call, rendered once)
//! filters (error) ────┘        │
//!                              ├─→ console (stdout)
//!                              ├─→ rotation.rs (logs/info/YYYY-MM-DD.log, info and above)
//!                              └─→ rotation.rs (logs/errors/YYYY-MM-DD.log, errors only)
//! ```
//!
//! Bootstrap and framework diagnostics go through `tracing` instead; see `main.rs`.

pub mod logging;
pub mod rotation;

pub use logging::{Destination, ErrorPayload, Level, LogMessage, LogRecord, Logger, MemoryDestination};
pub use rotation::DailyRollingFile;
