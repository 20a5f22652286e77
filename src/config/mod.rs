//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env.<NODE_ENV> file (optional)
//!     + process environment (wins on conflict)
//!     → loader.rs (collect key/value pairs)
//!     → validation.rs (schema checks, every failing field reported)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Validation is a pure function over a key/value map
//! - The caller decides whether a validation failure aborts the process

pub mod database;
pub mod loader;
pub mod schema;
pub mod validation;

pub use database::DatabaseOptions;
pub use loader::{check_env, load_config, ConfigError};
pub use schema::{AppConfig, DatabaseSettings, LoggingConfig, NodeEnv, RedisSettings};
pub use validation::{validate_env, ValidationIssue};
