//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,
}

/// Errors raised by a message store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing storage rejected the operation
    #[error("storage error: {0}")]
    Storage(String),

    /// The storage could not be reached (worker panicked, lock poisoned)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
