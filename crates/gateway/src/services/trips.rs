use core::ops::Deref;

use serde_json::{Value, json};

use tms_core::{TripId, TripStatus};

use crate::client::GatewayClient;
use crate::error::ApiError;
use crate::services::resource::Resource;

/// `/trips`: CRUD plus status transitions.
#[derive(Debug, Clone)]
pub struct Trips {
    records: Resource<Value>,
}

impl Trips {
    pub fn new(gateway: GatewayClient) -> Self {
        Self {
            records: Resource::new(gateway, "/trips"),
        }
    }

    /// `PATCH /trips/{id}/status`. The backend stamps actual departure/arrival times.
    pub async fn update_status(&self, id: TripId, status: TripStatus) -> Result<Value, ApiError> {
        self.records
            .gateway()
            .patch(&format!("{}/status", self.records.item_path(id)))
            .json(&json!({ "status": status }))
            .send_json()
            .await
    }
}

impl Deref for Trips {
    type Target = Resource<Value>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// `/maintenance`: CRUD plus the per-vehicle cost report.
#[derive(Debug, Clone)]
pub struct Maintenance {
    records: Resource<Value>,
}

impl Maintenance {
    pub fn new(gateway: GatewayClient) -> Self {
        Self {
            records: Resource::new(gateway, "/maintenance"),
        }
    }

    /// `GET /maintenance/reports/costs-by-vehicle`.
    pub async fn costs_by_vehicle(&self) -> Result<Value, ApiError> {
        self.records
            .gateway()
            .get("/maintenance/reports/costs-by-vehicle")
            .send_json()
            .await
    }
}

impl Deref for Maintenance {
    type Target = Resource<Value>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
