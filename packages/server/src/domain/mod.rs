//! Domain layer for the chat relay.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::Message;
pub use error::{RepositoryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use repository::MessageRepository;
pub use value_object::{ConnectionId, MessageContent, MessageId, Timestamp, Username};

#[cfg(test)]
pub use repository::MockMessageRepository;
