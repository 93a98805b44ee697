//! Error types for path recording.

use thiserror::Error;

/// Errors that can occur while recording or parsing a member path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// A member name is empty or contains a reserved character.
    #[error("invalid member name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The closure did something the recorder cannot turn into a path.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
}

/// Convenience type alias for path operations.
pub type PathResult<T> = std::result::Result<T, PathError>;
