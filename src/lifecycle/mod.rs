//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build logger → Bind listener → Serve
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C → broadcast → stop accepting → drain → drop logger (flush files)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, listener last
//! - Config validation failure is fatal; nothing binds before it passes

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, Bootstrap};
