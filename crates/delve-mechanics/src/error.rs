//! Error types for the mechanics engine.

use delve_core::CoreError;

/// Errors that can occur during mechanics operations.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A value object was constructed with malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was attempted in a state that does not permit it.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A scripted random source ran out of faces.
    #[error("scripted dice exhausted after {0} faces")]
    ScriptExhausted(usize),

    /// A core value could not be constructed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
