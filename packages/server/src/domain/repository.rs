//! Repository traits owned by the domain layer.
//!
//! Infrastructure provides the implementations; use cases only see the trait.

use async_trait::async_trait;

use super::{Message, MessageContent, RepositoryError, Username};

/// Durable, append-only record of chat messages.
///
/// Implementations must be safe to call concurrently. Each `append` is an
/// independent unit; there is no transaction spanning several messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a message, assigning its id and creation timestamp.
    async fn append(
        &self,
        username: Username,
        content: MessageContent,
    ) -> Result<Message, RepositoryError>;

    /// All stored messages, `created_at` ascending with ties broken by id.
    async fn list_all(&self) -> Result<Vec<Message>, RepositoryError>;
}
