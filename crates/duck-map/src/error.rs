//! Error types for mapping operations.

use duck_path::PathError;
use duck_store::StoreError;
use thiserror::Error;

/// Errors that can occur while mapping between stores and shapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// `set` named a member the target does not have, or one without a value.
    #[error("the member {path} does not exist or has no value")]
    MissingProperty { path: String },

    /// An interface target declares behaviour members.
    #[error("{shape} declares behaviour members ({}); only property members can be mapped", .methods.join(", "))]
    UnsupportedShape { shape: String, methods: Vec<String> },

    /// Malformed input to a mapping operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation exists for symmetry but has no implementation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("path error: {0}")]
    Path(#[from] PathError),
}

/// Flat classification of every failure a mapping operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateKey,
    MemberNotFound,
    MissingProperty,
    TypeMismatch,
    InvalidArgument,
    UnsupportedShape,
    UnsupportedExpression,
    NotImplemented,
    StructureTooDeep,
    Config,
}

impl MapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::MissingProperty { .. } => ErrorKind::MissingProperty,
            MapError::UnsupportedShape { .. } => ErrorKind::UnsupportedShape,
            MapError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            MapError::NotImplemented(_) => ErrorKind::NotImplemented,
            MapError::Store(err) => match err {
                StoreError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
                StoreError::MemberNotFound { .. } => ErrorKind::MemberNotFound,
                StoreError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
                StoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
                StoreError::StructureTooDeep { .. } => ErrorKind::StructureTooDeep,
                StoreError::Config(_) => ErrorKind::Config,
            },
            MapError::Path(err) => match err {
                PathError::InvalidName { .. } => ErrorKind::InvalidArgument,
                PathError::UnsupportedExpression(_) => ErrorKind::UnsupportedExpression,
            },
        }
    }
}

/// Convenience type alias for mapping operations.
pub type MapResult<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_see_through_wrapped_errors() {
        let dup = MapError::from(StoreError::DuplicateKey { key: "a".into() });
        assert_eq!(dup.kind(), ErrorKind::DuplicateKey);
        let name = MapError::from(PathError::InvalidName {
            name: "a b".into(),
            reason: "contains whitespace".into(),
        });
        assert_eq!(name.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            MapError::NotImplemented("set_with").kind(),
            ErrorKind::NotImplemented
        );
    }

    #[test]
    fn unsupported_shape_lists_methods() {
        let err = MapError::UnsupportedShape {
            shape: "Directory".into(),
            methods: vec!["lookup".into(), "refresh".into()],
        };
        assert_eq!(
            err.to_string(),
            "Directory declares behaviour members (lookup, refresh); only property members can be mapped"
        );
    }
}
