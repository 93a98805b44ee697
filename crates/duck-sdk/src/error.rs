use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DuckError {
    #[error("store error: {0}")]
    Store(#[from] duck_store::StoreError),

    #[error("path error: {0}")]
    Path(#[from] duck_path::PathError),

    #[error("map error: {0}")]
    Map(#[from] duck_map::MapError),
}

impl DuckError {
    /// Classify the failure, whichever layer reported it.
    pub fn kind(&self) -> duck_map::ErrorKind {
        match self {
            DuckError::Store(err) => duck_map::MapError::Store(err.clone()).kind(),
            DuckError::Path(err) => duck_map::MapError::Path(err.clone()).kind(),
            DuckError::Map(err) => err.kind(),
        }
    }
}

pub type DuckResult<T> = Result<T, DuckError>;
