use serde_json::Value;

use crate::client::GatewayClient;
use crate::error::ApiError;
use crate::services::resource::QueryParams;

/// `/analytics/*` indicators. Payloads are passed through untyped.
#[derive(Debug, Clone)]
pub struct Analytics {
    gateway: GatewayClient,
}

impl Analytics {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }

    pub async fn customer_retention(&self, params: &QueryParams) -> Result<Value, ApiError> {
        self.indicator("customer-retention", params).await
    }

    pub async fn fleet_occupation(&self, params: &QueryParams) -> Result<Value, ApiError> {
        self.indicator("fleet-occupation", params).await
    }

    pub async fn average_cost_per_km(&self, params: &QueryParams) -> Result<Value, ApiError> {
        self.indicator("average-cost-per-km", params).await
    }

    pub async fn future_earnings(&self, params: &QueryParams) -> Result<Value, ApiError> {
        self.indicator("future-earnings", params).await
    }

    pub async fn on_time_delivery(&self, params: &QueryParams) -> Result<Value, ApiError> {
        self.indicator("on-time-delivery", params).await
    }

    async fn indicator(&self, name: &str, params: &QueryParams) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/analytics/{name}"))
            .query(&params.to_query())
            .send_json()
            .await
    }
}
