//! Environment validation.
//!
//! # Responsibilities
//! - Check every schema key: presence, non-empty strings, numeric parse, enum membership
//! - Apply defaults for optional keys
//! - Produce a fully typed [`AppConfig`]
//!
//! # Design Decisions
//! - Returns all validation issues, not just the first
//! - Validation is a pure function: env map → Result<AppConfig, Vec<ValidationIssue>>
//! - No logging and no process exit here; the loader and `main` own those

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::schema::{AppConfig, DatabaseSettings, LoggingConfig, NodeEnv, RedisSettings};

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ValidationIssue {
    /// Name of the environment variable.
    pub path: String,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationIssue {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a snapshot of environment variables.
pub fn validate_env(vars: &HashMap<String, String>) -> Result<AppConfig, Vec<ValidationIssue>> {
    let mut check = Checker {
        vars,
        issues: Vec::new(),
    };

    let node_env = check.node_env("NODE_ENV");
    let port = check.required_number::<u16>("PORT");
    let db_host = check.required_string("DB_HOST");
    let db_port = check.required_number::<u16>("DB_PORT");
    let db_user = check.required_string("DB_USER");
    let db_password = check.required_string("DB_PASSWORD");
    let db_name = check.required_string("DB_NAME");
    let redis_host = check.required_string("REDIS_HOST");
    let redis_port = check.required_number::<u16>("REDIS_PORT");

    let defaults = LoggingConfig::default();
    let log_dir = check.optional_string("LOG_DIR").map(PathBuf::from);
    let info_retention = check.optional_number::<u32>("LOG_INFO_RETENTION_DAYS");
    let error_retention = check.optional_number::<u32>("LOG_ERROR_RETENTION_DAYS");

    if !check.issues.is_empty() {
        return Err(check.issues);
    }

    // Every required value is Some once no issue has been recorded.
    match (
        port, db_host, db_port, db_user, db_password, db_name, redis_host, redis_port,
    ) {
        (
            Some(port),
            Some(host),
            Some(db_port),
            Some(user),
            Some(password),
            Some(name),
            Some(redis_host),
            Some(redis_port),
        ) => Ok(AppConfig {
            node_env,
            port,
            database: DatabaseSettings {
                host,
                port: db_port,
                user,
                password,
                name,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
            },
            logging: LoggingConfig {
                dir: log_dir.unwrap_or(defaults.dir),
                info_retention_days: info_retention.unwrap_or(defaults.info_retention_days),
                error_retention_days: error_retention.unwrap_or(defaults.error_retention_days),
            },
        }),
        _ => Err(vec![ValidationIssue::new("<root>", "Incomplete configuration")]),
    }
}

struct Checker<'a> {
    vars: &'a HashMap<String, String>,
    issues: Vec<ValidationIssue>,
}

impl<'a> Checker<'a> {
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.vars.get(key).map(String::as_str)
    }

    fn node_env(&mut self, key: &str) -> NodeEnv {
        match self.raw(key) {
            None => NodeEnv::default(),
            Some(value) => match value.parse() {
                Ok(env) => env,
                Err(()) => {
                    let expected = NodeEnv::VARIANTS
                        .iter()
                        .map(|v| format!("'{}'", v))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    self.issues.push(ValidationIssue::new(
                        key,
                        format!("Invalid enum value. Expected {}, received '{}'", expected, value),
                    ));
                    NodeEnv::default()
                }
            },
        }
    }

    fn required_string(&mut self, key: &str) -> Option<String> {
        match self.raw(key) {
            None => {
                self.issues.push(ValidationIssue::new(key, "Required"));
                None
            }
            Some("") => {
                self.issues.push(ValidationIssue::new(key, "must not be empty"));
                None
            }
            Some(value) => Some(value.to_string()),
        }
    }

    fn optional_string(&mut self, key: &str) -> Option<String> {
        match self.raw(key) {
            None => None,
            Some("") => {
                self.issues.push(ValidationIssue::new(key, "must not be empty"));
                None
            }
            Some(value) => Some(value.to_string()),
        }
    }

    fn required_number<T: FromStr>(&mut self, key: &str) -> Option<T> {
        if self.raw(key).is_none() {
            self.issues.push(ValidationIssue::new(key, "Required"));
            return None;
        }
        self.optional_number(key)
    }

    fn optional_number<T: FromStr>(&mut self, key: &str) -> Option<T> {
        let value = self.raw(key)?;
        match value.parse::<T>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.issues
                    .push(ValidationIssue::new(key, format!("{} must be a number", key)));
                None
            }
        }
    }
}
