//! UseCase: 接続登録処理

use std::sync::Arc;

use crate::{
    domain::ConnectionId,
    infrastructure::registry::{ConnectionRegistry, ConnectionSink},
};

/// 接続登録のユースケース
pub struct ConnectSessionUseCase {
    registry: Arc<ConnectionRegistry>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 受け付けた接続をブロードキャスト対象に加える
    ///
    /// 既に登録済みの場合は何もせず `false` を返す
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sink: Arc<dyn ConnectionSink>,
    ) -> bool {
        let added = self.registry.register(connection_id, sink).await;
        if added {
            tracing::info!(
                %connection_id,
                connections = self.registry.connection_count(),
                "connection registered"
            );
        } else {
            tracing::warn!(%connection_id, "connection already registered");
        }
        added
    }
}
