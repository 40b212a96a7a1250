//! SQLite Message Repository 実装
//!
//! メッセージ履歴を SQLite ファイルに永続化します。rusqlite はブロッキング API のため、
//! 全ての操作は `spawn_blocking` 上で単一の接続を Mutex 越しに使って実行します。

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rusqlite::{Connection, params};

use crate::{
    domain::{
        Message, MessageContent, MessageId, MessageRepository, RepositoryError, Timestamp,
        Username,
    },
    infrastructure::repository::{Clock, system_clock},
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages (created_at, id);
";

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}

/// SQLite Message Repository 実装
pub struct SqliteMessageRepository {
    conn: Arc<Mutex<Connection>>,
    clock: Clock,
}

impl SqliteMessageRepository {
    /// Open (or create) the database file at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            clock: system_clock(),
        })
    }

    /// Replace the clock used for `created_at`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
            f(&guard).map_err(RepositoryError::from)
        })
        .await
        .map_err(|e| RepositoryError::Unavailable(e.to_string()))?
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn append(
        &self,
        username: Username,
        content: MessageContent,
    ) -> Result<Message, RepositoryError> {
        let created_at = Timestamp::new((self.clock)());
        let name = username.as_str().to_string();
        let text = content.as_str().to_string();

        let id = self
            .with_conn(move |conn| {
                let _ = conn.execute(
                    "INSERT INTO messages (username, content, created_at) VALUES (?1, ?2, ?3)",
                    params![name, text, created_at.value()],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        tracing::debug!(id, "stored message");
        Ok(Message::new(MessageId::new(id), username, content, created_at))
    }

    async fn list_all(&self) -> Result<Vec<Message>, RepositoryError> {
        let rows = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, username, content, created_at FROM messages
                     ORDER BY created_at ASC, id ASC",
                )?;
                let rows = stmt
                    .query_map([], row_to_message)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(id, username, content, created_at)| -> Result<Message, RepositoryError> {
                let content = MessageContent::new(content)
                    .map_err(|e| RepositoryError::Storage(format!("message {id}: {e}")))?;
                Ok(Message::new(
                    MessageId::new(id),
                    Username::new(username),
                    content,
                    Timestamp::new(created_at),
                ))
            })
            .collect()
    }
}
