//! SQLite Repository 実装

mod message;

pub use message::SqliteMessageRepository;
