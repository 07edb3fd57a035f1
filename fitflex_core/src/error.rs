//! Error types for the fitflex_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitflex_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A session operation was attempted from a state that forbids it
    #[error("Invalid transition: cannot {operation}: {reason}")]
    InvalidTransition {
        operation: &'static str,
        reason: String,
    },

    /// An exercise or set index outside its collection's bounds
    #[error("{collection} index {index} out of range (len {len})")]
    OutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    /// A workout template that cannot seed a session
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Workout id not present in the catalog
    #[error("Unknown workout: {0}")]
    UnknownWorkout(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_transition(operation: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidTransition {
            operation,
            reason: reason.into(),
        }
    }

    /// True for the engine's state-machine rejections (as opposed to I/O or parse failures)
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidTransition { .. } | Error::OutOfRange { .. }
        )
    }
}
