// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkyrigError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Unsupported cloud provider: {0}")]
    UnsupportedCloud(String),

    /// A remote (or provisioning-tool) command exited nonzero or could not
    /// be started. `command` is a sanitized rendering of the argument vector
    /// with credential material elided.
    #[error("Command `{command}` failed with exit code {exit_code}")]
    RemoteExecution {
        exit_code: i32,
        command: String,
        stderr: String,
    },

    /// The capture log file could not be opened or written. Fatal for the
    /// current capture session; never retried.
    #[error("Log capture I/O error: {0}")]
    StreamIo(std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SkyrigError>;
