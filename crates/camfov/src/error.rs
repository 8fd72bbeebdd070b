//! Error types for the orchestration layer.

use camfov_cone::SynthesisError;
use thiserror::Error;

/// Errors raised by settings handling, region commits and rendering.
#[derive(Error, Debug)]
pub enum FovError {
    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A render request is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Settings file could not be read or written.
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed or serialized.
    #[error("settings format error: {0}")]
    Format(String),

    /// The region sink rejected a batch.
    #[error("region commit failed: {0}")]
    Sink(String),

    /// Boundary synthesis failed outright.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

impl From<toml::de::Error> for FovError {
    fn from(e: toml::de::Error) -> Self {
        FovError::Format(e.to_string())
    }
}

impl From<toml::ser::Error> for FovError {
    fn from(e: toml::ser::Error) -> Self {
        FovError::Format(e.to_string())
    }
}

impl From<serde_json::Error> for FovError {
    fn from(e: serde_json::Error) -> Self {
        FovError::Format(e.to_string())
    }
}

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, FovError>;
