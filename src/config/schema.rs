//! Configuration schema definitions.
//!
//! This module defines the validated configuration produced at startup.
//! Values only ever come out of [`validate_env`](super::validate_env), so
//! every field here is known to be well-formed.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// Runtime mode, selects error response verbosity.
    pub node_env: NodeEnv,

    /// HTTP listening port.
    pub port: u16,

    /// Database connection settings.
    pub database: DatabaseSettings,

    /// Cache service connection settings.
    pub redis: RedisSettings,

    /// Log file destinations.
    pub logging: LoggingConfig,
}

/// Runtime mode of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeEnv {
    #[default]
    Dev,
    Prod,
    Test,
}

impl NodeEnv {
    pub const VARIANTS: [&'static str; 3] = ["dev", "prod", "test"];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeEnv::Dev => "dev",
            NodeEnv::Prod => "prod",
            NodeEnv::Test => "test",
        }
    }
}

impl fmt::Display for NodeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeEnv {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(NodeEnv::Dev),
            "prod" => Ok(NodeEnv::Prod),
            "test" => Ok(NodeEnv::Test),
            _ => Err(()),
        }
    }
}

/// Database connection settings.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Cache service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
}

/// Log file layout and retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    /// Root directory; `info/` and `errors/` live underneath.
    pub dir: PathBuf,

    /// Days an info file is kept before it is pruned.
    pub info_retention_days: u32,

    /// Days an error file is kept before it is pruned.
    pub error_retention_days: u32,
}

impl LoggingConfig {
    pub fn info_dir(&self) -> PathBuf {
        self.dir.join("info")
    }

    pub fn error_dir(&self) -> PathBuf {
        self.dir.join("errors")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            info_retention_days: 14,
            error_retention_days: 30,
        }
    }
}
