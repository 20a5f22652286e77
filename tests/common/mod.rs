//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use app_scaffold::config::{validate_env, AppConfig, NodeEnv};
use app_scaffold::http::AppState;
use app_scaffold::observability::{Level, Logger, MemoryDestination};

/// A valid configuration for the given mode.
pub fn config(node_env: NodeEnv) -> AppConfig {
    let env: HashMap<String, String> = [
        ("NODE_ENV", node_env.as_str()),
        ("PORT", "3000"),
        ("DB_HOST", "localhost"),
        ("DB_PORT", "5432"),
        ("DB_USER", "app"),
        ("DB_PASSWORD", "secret"),
        ("DB_NAME", "scaffold"),
        ("REDIS_HOST", "localhost"),
        ("REDIS_PORT", "6379"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    validate_env(&env).expect("test env is valid")
}

/// Application state whose logger writes into memory.
///
/// Returns the state plus an info-level and an error-level capture.
#[allow(dead_code)]
pub fn state(node_env: NodeEnv) -> (AppState, MemoryDestination, MemoryDestination) {
    let info = MemoryDestination::new(Level::Info);
    let errors = MemoryDestination::new(Level::Error);
    let logger = Logger::new(vec![Box::new(info.clone()), Box::new(errors.clone())]);
    let state = AppState::new(Arc::new(config(node_env)), Arc::new(logger));
    (state, info, errors)
}
