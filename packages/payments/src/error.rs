// ABOUTME: Error types for the settlement core
// ABOUTME: Per-item processor failures become warnings, never errors

use bountyboard_requests::RequestError;
use bountyboard_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettlementError {
    /// Malformed input or an illegal operation for the current state.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Persisted state violates a settlement invariant; the phase aborts
    /// before any money moves.
    #[error("Consistency check failed: {0}")]
    Consistency(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for SettlementError {
    fn from(err: sqlx::Error) -> Self {
        SettlementError::Storage(StorageError::Sqlx(err))
    }
}

pub type SettlementResult<T> = Result<T, SettlementError>;

/// Failure from the payment processor for a single charge or transfer.
/// Isolated per item; siblings in the same phase still run.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("payment declined: {0}")]
    Declined(String),
    #[error("processor request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected processor response: {0}")]
    Malformed(String),
}
