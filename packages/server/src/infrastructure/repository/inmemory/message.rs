//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! Vec をインメモリ DB として使用します。プロセス終了とともに履歴は失われます。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        Message, MessageContent, MessageId, MessageRepository, RepositoryError, Timestamp,
        Username, entity::sort_chronologically,
    },
    infrastructure::repository::{Clock, system_clock},
};

#[derive(Default)]
struct Store {
    messages: Vec<Message>,
    last_id: i64,
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    store: Mutex<Store>,
    clock: Clock,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// 任意の時計を使う InMemoryMessageRepository を作成
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            clock,
        }
    }

    /// 保存済みメッセージ数
    pub async fn count(&self) -> usize {
        self.store.lock().await.messages.len()
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(
        &self,
        username: Username,
        content: MessageContent,
    ) -> Result<Message, RepositoryError> {
        let mut store = self.store.lock().await;
        store.last_id += 1;
        let message = Message::new(
            MessageId::new(store.last_id),
            username,
            content,
            Timestamp::new((self.clock)()),
        );
        store.messages.push(message.clone());
        Ok(message)
    }

    async fn list_all(&self) -> Result<Vec<Message>, RepositoryError> {
        let mut messages = self.store.lock().await.messages.clone();
        sort_chronologically(&mut messages);
        Ok(messages)
    }
}
