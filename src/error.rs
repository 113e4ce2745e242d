//! Error types for the separation core

use std::fmt;

/// Errors that can occur during background/foreground separation
#[derive(Debug, Clone)]
pub enum SeparationError {
    /// Invalid input signal (zero sample rate, mismatched channel lengths, ...)
    InvalidInput(String),

    /// Invalid configuration (bad period range, degenerate adaptive window, ...)
    InvalidConfig(String),

    /// Internal processing error (shape mismatch between pipeline stages)
    ProcessingError(String),

    /// The progress callback requested cancellation
    Cancelled,
}

impl fmt::Display for SeparationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeparationError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            SeparationError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SeparationError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            SeparationError::Cancelled => write!(f, "Separation cancelled by caller"),
        }
    }
}

impl std::error::Error for SeparationError {}
