//! Core error types for timegrid-core.
//!
//! This module defines the error hierarchy using thiserror. Subsystem
//! errors ([`ApiError`](crate::api::ApiError), [`SyncError`](crate::sync::SyncError))
//! live next to their subsystems and fold into [`EngineError`] here.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for timegrid-core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Validation errors (rejected before any mutation)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote event store errors
    #[error("Event store API error: {0}")]
    Api(#[from] crate::api::ApiError),

    /// External calendar sync errors
    #[error("Calendar sync error: {0}")]
    Sync(#[from] crate::sync::SyncError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end_time ({end}) must be greater than start_time ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid recurrence rule
    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrence(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<Box<dyn std::error::Error + Send + Sync>> for EngineError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        EngineError::Custom(err.to_string())
    }
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
