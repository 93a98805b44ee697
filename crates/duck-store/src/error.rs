/// Errors from store access and value coercion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The key already exists in the declared or the dynamic partition.
    #[error("can't add the member {key} as it has already been added")]
    DuplicateKey { key: String },

    /// A member-style read named a member the store does not have.
    #[error("member not found: {name}")]
    MemberNotFound { name: String },

    /// A value could not be converted to the type of the target member.
    #[error(
        "the value {value} provided is of type {source_type} which can't be converted to the member {member} of type {target_type}"
    )]
    TypeMismatch {
        value: String,
        source_type: String,
        member: String,
        target_type: String,
    },

    /// Malformed input to a store operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Recursive descent went deeper than the configured limit.
    #[error("structure nests deeper than the configured maximum of {max_depth}")]
    StructureTooDeep { max_depth: usize },

    /// The mapping configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
