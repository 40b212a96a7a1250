//! Live connection set and broadcast fan-out.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures_util::future::join_all;
use tokio::sync::RwLock;

use crate::domain::ConnectionId;

use super::sink::{ConnectionSink, DeliveryError};

/// Default upper bound on a single connection's delivery.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the payload was handed to
    pub delivered: usize,
    /// Connections removed because delivery failed
    pub removed: Vec<ConnectionId>,
}

/// Manages the set of open connections.
///
/// The registry references each connection's sink but does not own the
/// transport. All access goes through the inner lock, so concurrent
/// register / deregister / broadcast never observe a half-updated set.
pub struct ConnectionRegistry {
    /// Open connections indexed by connection ID.
    connections: RwLock<HashMap<ConnectionId, Arc<dyn ConnectionSink>>>,
    /// Live count, readable without taking the lock.
    active_count: AtomicUsize,
    /// Upper bound on one connection's delivery during a broadcast.
    delivery_timeout: Duration,
}

impl ConnectionRegistry {
    /// Create an empty registry with the default delivery timeout.
    pub fn new() -> Self {
        Self::with_delivery_timeout(DEFAULT_DELIVERY_TIMEOUT)
    }

    /// Create an empty registry with a custom delivery timeout.
    pub fn with_delivery_timeout(delivery_timeout: Duration) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            active_count: AtomicUsize::new(0),
            delivery_timeout,
        }
    }

    /// Add a newly accepted connection.
    ///
    /// Returns `false`, leaving the existing entry untouched, if the id is
    /// already a member.
    pub async fn register(&self, id: ConnectionId, sink: Arc<dyn ConnectionSink>) -> bool {
        let mut conns = self.connections.write().await;
        if conns.contains_key(&id) {
            return false;
        }
        let _ = conns.insert(id, sink);
        let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Remove a connection. Removing an absent id is a no-op and returns `false`.
    pub async fn deregister(&self, id: &ConnectionId) -> bool {
        let mut conns = self.connections.write().await;
        if conns.remove(id).is_some() {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Deliver `payload` to every registered connection, the sender included.
    ///
    /// Targets are delivered to concurrently, each bounded by the delivery
    /// timeout. A target whose delivery fails or times out is deregistered;
    /// the failure never reaches the caller or the other targets.
    pub async fn broadcast(&self, payload: Arc<str>) -> BroadcastReport {
        let targets: Vec<(ConnectionId, Arc<dyn ConnectionSink>)> = {
            let conns = self.connections.read().await;
            conns
                .iter()
                .map(|(id, sink)| (*id, Arc::clone(sink)))
                .collect()
        };

        let timeout = self.delivery_timeout;
        let results = join_all(targets.into_iter().map(|(id, sink)| {
            let payload = Arc::clone(&payload);
            async move {
                let result = match tokio::time::timeout(timeout, sink.deliver(payload)).await {
                    Ok(result) => result,
                    Err(_) => Err(DeliveryError::TimedOut(timeout)),
                };
                (id, result)
            }
        }))
        .await;

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(connection_id = %id, error = %e, "delivery failed, dropping connection");
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            let mut conns = self.connections.write().await;
            for id in failed {
                if conns.remove(&id).is_some() {
                    let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
                    report.removed.push(id);
                }
            }
        }

        tracing::debug!(
            delivered = report.delivered,
            removed = report.removed.len(),
            "broadcast message"
        );
        report
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    /// Whether `id` is currently registered.
    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.read().await.contains_key(id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
