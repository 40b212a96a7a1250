//! Server startup errors.

use thiserror::Error;

use crate::domain::RepositoryError;

/// Errors that stop the server from starting or serving
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving the listener failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The message store could not be opened
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The configured allowed origin is not a valid header value
    #[error("invalid allowed origin: '{0}'")]
    InvalidOrigin(String),
}
