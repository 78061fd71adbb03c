// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatusBlocksError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("another instance of statusblocks is already running (lock: {})", path.display())]
    AlreadyRunning { path: PathBuf },

    #[error("Status publisher unavailable: {0}")]
    PublisherUnavailable(String),

    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read output of '{command}': {source}")]
    Read {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StatusBlocksError {
    /// Process exit code for this error.
    ///
    /// "Already running" is kept distinct from every other startup or
    /// runtime failure so wrappers can tell the two apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            StatusBlocksError::AlreadyRunning { .. } => 2,
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, StatusBlocksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_running_has_its_own_exit_code() {
        let err = StatusBlocksError::AlreadyRunning {
            path: PathBuf::from("/tmp/statusblocks.pid"),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/tmp/statusblocks.pid"));
    }

    #[test]
    fn other_errors_exit_with_one() {
        let err = StatusBlocksError::ConfigError("no blocks".to_string());
        assert_eq!(err.exit_code(), 1);

        let err = StatusBlocksError::PublisherUnavailable("DISPLAY is not set".to_string());
        assert_eq!(err.exit_code(), 1);
    }
}
