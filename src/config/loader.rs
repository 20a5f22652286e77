//! Configuration loading from the environment.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_env, ValidationIssue};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    #[error("Environment validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Default env file for the current process: `.env.<NODE_ENV>`, `dev` when unset.
pub fn default_env_file(process_env: &HashMap<String, String>) -> PathBuf {
    let node_env = process_env
        .get("NODE_ENV")
        .map(String::as_str)
        .unwrap_or("dev");
    PathBuf::from(format!(".env.{}", node_env))
}

/// Load and validate configuration from the process environment and an optional env file.
///
/// Every failing field is logged before the error is returned.
pub fn load_config(env_file: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let process_env: HashMap<String, String> = std::env::vars().collect();
    let env_file = env_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_env_file(&process_env));

    let vars = merge_env_file(&env_file, process_env)?;
    check_env(&vars)
}

/// Validate `vars`, logging the outcome and every failing field.
pub fn check_env(vars: &HashMap<String, String>) -> Result<AppConfig, ConfigError> {
    match validate_env(vars) {
        Ok(config) => {
            tracing::info!("Env validation passed");
            Ok(config)
        }
        Err(issues) => {
            report(&issues);
            Err(ConfigError::Validation(issues))
        }
    }
}

fn report(issues: &[ValidationIssue]) {
    for issue in issues {
        tracing::error!("→ {}: {}", issue.path, issue.message);
    }
    tracing::error!("Env validation error");
}

/// Overlay `process_env` on top of the values in `path`.
///
/// A missing file is not an error; variables set in the process always win.
pub fn merge_env_file(
    path: &Path,
    mut process_env: HashMap<String, String>,
) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match dotenv::from_filename_iter(path) {
        Ok(iter) => iter,
        Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No env file found");
            return Ok(process_env);
        }
        Err(source) => {
            return Err(ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    for item in iter {
        let (key, value) = item.map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;
        process_env.entry(key).or_insert(value);
    }

    tracing::debug!(path = %path.display(), "Env file loaded");
    Ok(process_env)
}
