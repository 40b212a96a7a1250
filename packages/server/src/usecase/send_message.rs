//! UseCase: メッセージ送信処理
//!
//! 受信したメッセージを検証し、保存してから全接続へブロードキャストする。
//! 保存に失敗したメッセージはブロードキャストしない。

use std::sync::Arc;

use crate::{
    domain::{Message, MessageContent, MessageRepository, Username},
    infrastructure::{
        dto::websocket::{InboundMessage, OutboundMessage},
        registry::{BroadcastReport, ConnectionRegistry},
    },
};

use super::error::SendMessageError;

/// A stored and broadcast message together with the fan-out result
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: Message,
    pub report: BroadcastReport,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn MessageRepository>,
    /// ブロードキャスト先の接続レジストリ
    registry: Arc<ConnectionRegistry>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SentMessage))` - 保存とブロードキャストが完了
    /// * `Ok(None)` - 内容が空のため破棄（保存もブロードキャストもしない）
    /// * `Err(SendMessageError)` - 保存または変換に失敗
    pub async fn execute(
        &self,
        inbound: InboundMessage,
    ) -> Result<Option<SentMessage>, SendMessageError> {
        // 1. 検証（空の内容は黙って破棄）
        let content = match MessageContent::new(inbound.content.unwrap_or_default()) {
            Ok(content) => content,
            Err(_) => return Ok(None),
        };
        let username = Username::or_anonymous(inbound.username);

        // 2. 保存（ID と作成日時はストアが割り当てる）
        let message = self.repository.append(username, content).await?;

        // 3. 送信用に一度だけシリアライズしてブロードキャスト
        let payload = serde_json::to_string(&OutboundMessage::from(&message))
            .map_err(|e| SendMessageError::Encoding(e.to_string()))?;
        let report = self.registry.broadcast(Arc::from(payload)).await;

        Ok(Some(SentMessage { message, report }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionIdFactory, MockMessageRepository, RepositoryError},
        infrastructure::{registry::ChannelSink, repository::InMemoryMessageRepository},
    };
    use tokio::sync::mpsc;

    async fn connect(registry: &ConnectionRegistry) -> mpsc::Receiver<Arc<str>> {
        let (sink, rx) = ChannelSink::channel(16);
        registry
            .register(ConnectionIdFactory::generate(), Arc::new(sink))
            .await;
        rx
    }

    fn inbound(username: Option<&str>, content: &str) -> InboundMessage {
        InboundMessage {
            username: username.map(str::to_string),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn test_send_message_success() {
        // テスト項目: 保存されたメッセージが送信者を含む全接続に届く
        // given (前提条件):
        let repository = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = SendMessageUseCase::new(repository.clone(), registry.clone());
        let mut alice_rx = connect(&registry).await;
        let mut bob_rx = connect(&registry).await;

        // when (操作):
        let sent = usecase
            .execute(inbound(Some("alice"), "hi"))
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert_eq!(sent.report.delivered, 2);
        assert_eq!(sent.message.username.as_str(), "alice");
        assert_eq!(repository.count().await, 1);

        let expected = serde_json::to_value(OutboundMessage::from(&sent.message)).unwrap();
        for rx in [&mut alice_rx, &mut bob_rx] {
            let frame = rx.try_recv().unwrap();
            let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(value, expected);
            assert_eq!(value["content"], "hi");
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_send_message_empty_content_is_dropped() {
        // テスト項目: 内容が空のメッセージは保存もブロードキャストもされない
        // given (前提条件):
        let repository = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = SendMessageUseCase::new(repository.clone(), registry.clone());
        let mut rx = connect(&registry).await;

        // when (操作):
        let result = usecase.execute(inbound(Some("alice"), "")).await;

        // then (期待する結果):
        assert!(matches!(result, Ok(None)));
        assert_eq!(repository.count().await, 0);
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_send_message_defaults_to_anonymous() {
        // テスト項目: ユーザー名がない場合は "Anonymous" で保存・配信される
        // given (前提条件):
        let repository = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = SendMessageUseCase::new(repository.clone(), registry.clone());
        let mut rx = connect(&registry).await;

        // when (操作):
        let sent = usecase.execute(inbound(None, "hello")).await.unwrap().unwrap();

        // then (期待する結果):
        assert_eq!(sent.message.username.as_str(), "Anonymous");
        let stored = repository.list_all().await.unwrap();
        assert_eq!(stored[0].username.as_str(), "Anonymous");
        let frame: serde_json::Value =
            serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame["username"], "Anonymous");
    }

    #[tokio::test]
    async fn test_send_message_persistence_failure_is_not_broadcast() {
        // テスト項目: 保存に失敗したメッセージはブロードキャストされない
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_append()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Storage("database is locked".to_string())));
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = SendMessageUseCase::new(Arc::new(repository), registry.clone());
        let mut rx = connect(&registry).await;

        // when (操作):
        let result = usecase.execute(inbound(Some("alice"), "hi")).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(SendMessageError::Persistence(RepositoryError::Storage(_)))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_message_without_connections() {
        // テスト項目: 接続がなくても保存される
        // given (前提条件):
        let repository = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let usecase = SendMessageUseCase::new(repository.clone(), registry);

        // when (操作):
        let sent = usecase.execute(inbound(None, "echo")).await.unwrap().unwrap();

        // then (期待する結果):
        assert_eq!(sent.report.delivered, 0);
        assert_eq!(repository.count().await, 1);
    }
}
