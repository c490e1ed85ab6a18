//! Shared error types for portfolio analysis.
//!
//! The derivation engines in [`crate::metrics`] and [`crate::risk`] are total
//! and never surface these errors to callers. They appear at the edges: loading
//! project inputs, reading configuration and applying threshold overrides.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for portfolio-lens operations
#[derive(Debug, Error)]
pub enum Error {
    /// Project input could not be read or decoded
    #[error("Input error in {path}: {message}")]
    Input { path: PathBuf, message: String },

    /// Configuration errors (unknown metric, unknown tier, bad file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors (non-monotonic threshold bands)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Analysis errors raised while evaluating a metrics snapshot
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create an input error with path context
    pub fn input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
