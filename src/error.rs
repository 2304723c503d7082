//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or modifying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON.
    #[error("{message} in file '{}'", path.display())]
    Parse { path: PathBuf, message: String },

    /// A configuration file parsed, but its root is not a JSON object.
    #[error("config file '{}' must contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    /// Mutation attempted on a sealed configuration.
    #[error("configuration is sealed and cannot be modified")]
    Sealed,

    /// A spawned load task panicked or was cancelled.
    #[error("config load task failed: {0}")]
    Task(String),

    /// Deserializing the configuration into a typed value failed.
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] serde_json::Error),
}

impl ConfigError {
    /// True when the error is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// The file the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::NotAnObject { path } => Some(path),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for ConfigError {
    fn from(err: tokio::task::JoinError) -> Self {
        ConfigError::Task(err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
