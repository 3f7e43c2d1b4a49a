//! HTTP implementation of the order-status client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::OrderServiceConfig;

use super::types::{OrderClientError, OrderStatus, OrderStatusClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdateBody<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    drone_id: Option<&'a str>,
}

/// Client for `PUT {base_url}/{order_id}/status`.
pub struct HttpOrderStatusClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderStatusClient {
    pub fn new(config: &OrderServiceConfig) -> Result<Self, OrderClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| OrderClientError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OrderStatusClient for HttpOrderStatusClient {
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        drone_id: Option<&str>,
    ) -> Result<(), OrderClientError> {
        let url = format!("{}/{}/status", self.base_url, order_id);
        debug!("Updating order {} to {}", order_id, status.as_str());

        let response = self
            .client
            .put(&url)
            .json(&StatusUpdateBody {
                status: status.as_str(),
                drone_id,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OrderClientError::Timeout
                } else {
                    OrderClientError::ConnectionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(OrderClientError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        Ok(())
    }
}
