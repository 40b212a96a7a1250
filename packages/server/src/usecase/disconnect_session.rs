//! UseCase: 接続解除処理
//!
//! 明示的な切断とエラー処理の両方から呼ばれる可能性があるため、
//! 未登録の接続に対する解除は何もしない。

use std::sync::Arc;

use crate::{domain::ConnectionId, infrastructure::registry::ConnectionRegistry};

/// 接続解除のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<ConnectionRegistry>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続をブロードキャスト対象から外す
    ///
    /// # Returns
    ///
    /// * `true` - この呼び出しで解除された
    /// * `false` - 既に解除済み（または未登録）
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        let removed = self.registry.deregister(connection_id).await;
        if removed {
            tracing::info!(
                %connection_id,
                connections = self.registry.connection_count(),
                "connection deregistered"
            );
        } else {
            tracing::debug!(%connection_id, "connection already deregistered");
        }
        removed
    }

    /// 残りの接続数を取得
    pub fn count_remaining_connections(&self) -> usize {
        self.registry.connection_count()
    }
}
