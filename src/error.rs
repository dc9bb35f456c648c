//! Error types for the engine

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Local validation errors raised by the engine.
///
/// Every engine call is a single in-memory computation, so these are never retried:
/// they are surfaced to the caller as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Match result string is not one of `win`, `loss` or `draw`
    #[error("Invalid match result: {0:?} (expected \"win\", \"loss\" or \"draw\")")]
    InvalidResult(String),

    /// Tournament format string is not recognized
    #[error("Unknown tournament format: {0:?}")]
    UnknownFormat(String),
}
