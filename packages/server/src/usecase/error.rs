//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RepositoryError;

/// Errors raised while handling one inbound chat message
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// The message could not be stored; it is not broadcast
    #[error("failed to persist message: {0}")]
    Persistence(#[from] RepositoryError),

    /// The stored message could not be encoded as an outbound frame
    #[error("failed to encode message: {0}")]
    Encoding(String),
}

/// An inbound frame that is not a `{username?, content}` record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed input: {0}")]
pub struct MalformedInput(pub String);
