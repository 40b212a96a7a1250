//! UseCase: 履歴取得処理

use std::sync::Arc;

use crate::domain::{Message, MessageRepository, RepositoryError};

/// 履歴取得のユースケース
pub struct FetchHistoryUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl FetchHistoryUseCase {
    /// 新しい FetchHistoryUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 保存済みの全メッセージを作成日時の昇順で取得
    pub async fn execute(&self) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.repository.list_all().await?;
        tracing::info!(count = messages.len(), "fetched message history");
        Ok(messages)
    }
}
