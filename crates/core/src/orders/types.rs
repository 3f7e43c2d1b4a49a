//! Types for order-status synchronization.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the order-service boundary.
#[derive(Debug, Error)]
pub enum OrderClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Order service returned HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("Request timeout")]
    Timeout,
}

/// Milestones the core reports to the order service.
///
/// The order service keeps its own status vocabulary; this enum is the
/// canonical one for the core and `as_str` is the explicit mapping at the
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    DroneAssigned,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::DroneAssigned => "DRONE_ASSIGNED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

/// Outbound client for the order service's status-update endpoint.
///
/// The endpoint is idempotent under repeated delivery of the same milestone,
/// so callers may fire the same update more than once without corrupting
/// order state.
#[async_trait]
pub trait OrderStatusClient: Send + Sync {
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        drone_id: Option<&str>,
    ) -> Result<(), OrderClientError>;
}
