//! Error types for core value construction.

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing core values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A catalog identifier was empty after trimming.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// A value was outside its permitted range.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
