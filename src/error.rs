//! Error types for conversion operations
//!
//! Malformed markdown is never an error: every ambiguous construct falls back
//! to literal passthrough. The variants below cover undecodable input bytes,
//! invalid arguments at the C boundary, and internal invariant violations in
//! the pass pipeline.

use thiserror::Error;

/// Errors that can occur during markdown to HTML conversion
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Character encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Restoration met a placeholder index that protection never registered
    #[error("Unknown placeholder index {0} during span restoration")]
    UnknownPlaceholder(usize),
    /// A registered placeholder was lost by an intermediate pass
    #[error("Placeholder {0} was never restored")]
    OrphanedPlaceholder(usize),
    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ConversionError {
    /// Get numeric error code for FFI
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::EncodingError(_) => 2,
            ConversionError::InvalidInput(_) => 5,
            ConversionError::UnknownPlaceholder(_) => 6,
            ConversionError::OrphanedPlaceholder(_) => 7,
            ConversionError::InternalError(_) => 99,
        }
    }

    /// Whether the error indicates a bug in pass ordering rather than bad input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ConversionError::UnknownPlaceholder(_) | ConversionError::OrphanedPlaceholder(_)
        )
    }
}
