//! Core error types for autoclicker-core.
//!
//! This module defines the error hierarchy using thiserror. Native input
//! failures are represented here but never escape a running scheduler: the
//! scheduler logs and swallows them at the point of dispatch.

use std::path::PathBuf;
use thiserror::Error;

use crate::input::ButtonPhase;
use crate::settings::MouseButton;

/// Core error type for autoclicker-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Native input errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// A control request could not be understood
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors reported by an [`InputPort`](crate::input::InputPort).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Reading or moving the pointer was refused by the host.
    #[error("Pointer {operation} failed: {message}")]
    Query {
        operation: &'static str,
        message: String,
    },

    /// A single button transition could not be injected.
    #[error("Failed to inject {button} {phase}: {message}")]
    Injection {
        button: MouseButton,
        phase: ButtonPhase,
        message: String,
    },

    /// No native input binding exists for this platform.
    #[error("Native input is not supported on {0}")]
    Unsupported(&'static str),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Could not locate or create the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
