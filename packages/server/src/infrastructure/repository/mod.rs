//! Repository パターンの実装
//!
//! ドメイン層が定義する Repository trait の具体的な実装を提供します。
//! UseCase 層は trait（ドメイン層）に依存し、この実装に直接依存しません（依存性の逆転）。

use std::sync::Arc;

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryMessageRepository;
pub use sqlite::SqliteMessageRepository;

/// Source of creation timestamps (Unix milliseconds) for stored messages.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wall clock used outside of tests.
pub fn system_clock() -> Clock {
    Arc::new(hiroba_shared::time::get_jst_timestamp)
}
