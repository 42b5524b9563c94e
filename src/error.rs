//! Error types for the code-set engine

use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Concept not found: {concept_id}")]
    ConceptNotFound { concept_id: i64 },

    #[error("Code set not found: {id}")]
    CodeSetNotFound { id: Uuid },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upstream store error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the failure came from the backing store rather than the caller.
    ///
    /// Only upstream failures are eligible for the one-shot fallback retry;
    /// caller errors surface verbatim.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Upstream(_) | Error::Other(_)
        )
    }
}
