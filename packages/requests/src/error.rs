// ABOUTME: Error types for the request aggregate
// ABOUTME: Validation and authorization reject before any write

use bountyboard_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    /// Malformed input; nothing was mutated.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Actor lacks the required role or relationship; nothing was mutated.
    #[error("Not allowed: {0}")]
    Authorization(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for RequestError {
    fn from(err: sqlx::Error) -> Self {
        RequestError::Storage(StorageError::Sqlx(err))
    }
}

pub type RequestResult<T> = Result<T, RequestError>;
