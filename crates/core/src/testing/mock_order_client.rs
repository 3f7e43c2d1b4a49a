//! Mock order-status client for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::orders::{OrderClientError, OrderStatus, OrderStatusClient};

/// A recorded status update for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedStatusUpdate {
    pub order_id: String,
    pub status: OrderStatus,
    pub drone_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of [`OrderStatusClient`].
///
/// Records every call for assertions and can simulate a downstream failure
/// on the next request.
#[derive(Debug, Default)]
pub struct MockOrderClient {
    recorded: RwLock<Vec<RecordedStatusUpdate>>,
    fail_next: RwLock<bool>,
}

impl MockOrderClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded status updates, in call order.
    pub async fn recorded(&self) -> Vec<RecordedStatusUpdate> {
        self.recorded.read().await.clone()
    }

    /// Make the next `update_status` call fail with a connection error.
    pub async fn fail_next(&self) {
        *self.fail_next.write().await = true;
    }
}

#[async_trait]
impl OrderStatusClient for MockOrderClient {
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        drone_id: Option<&str>,
    ) -> Result<(), OrderClientError> {
        if std::mem::take(&mut *self.fail_next.write().await) {
            return Err(OrderClientError::ConnectionFailed(
                "mock failure".to_string(),
            ));
        }

        self.recorded.write().await.push(RecordedStatusUpdate {
            order_id: order_id.to_string(),
            status,
            drone_id: drone_id.map(str::to_string),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
