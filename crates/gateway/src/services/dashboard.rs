use serde_json::Value;

use tms_core::DashboardStats;

use crate::client::GatewayClient;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct Dashboard {
    gateway: GatewayClient,
}

impl Dashboard {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.gateway.get("/dashboard/stats").send_json().await
    }

    pub async fn recent_trips(&self) -> Result<Vec<Value>, ApiError> {
        self.gateway.get("/dashboard/recent-trips").send_json().await
    }
}
