//! Resource services: thin typed wrappers over the gateway.
//!
//! Each method performs one HTTP verb against one resource path and hands the decoded
//! body back unchanged. None of them handle 401 themselves; the gateway does.

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod reports;
pub mod resource;
pub mod trips;

use serde_json::Value;
use tms_core::{Client, Driver, Vehicle};

use crate::client::GatewayClient;

pub use analytics::Analytics;
pub use auth::{AuthApi, TokenGrant};
pub use dashboard::Dashboard;
pub use reports::{ReportFormat, ReportKind, ReportRequest, ReportStatus, Reports};
pub use resource::{QueryParams, Resource};
pub use trips::{Maintenance, Trips};

/// All resource services, sharing one gateway.
#[derive(Debug, Clone)]
pub struct Services {
    gateway: GatewayClient,
}

impl Services {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.gateway.clone())
    }

    pub fn clients(&self) -> Resource<Client> {
        Resource::new(self.gateway.clone(), "/clients")
    }

    pub fn drivers(&self) -> Resource<Driver> {
        Resource::new(self.gateway.clone(), "/drivers")
    }

    pub fn vehicles(&self) -> Resource<Vehicle> {
        Resource::new(self.gateway.clone(), "/vehicles")
    }

    pub fn routes(&self) -> Resource<Value> {
        Resource::new(self.gateway.clone(), "/routes")
    }

    pub fn trips(&self) -> Trips {
        Trips::new(self.gateway.clone())
    }

    pub fn maintenance(&self) -> Maintenance {
        Maintenance::new(self.gateway.clone())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.gateway.clone())
    }

    pub fn reports(&self) -> Reports {
        Reports::new(self.gateway.clone())
    }

    pub fn analytics(&self) -> Analytics {
        Analytics::new(self.gateway.clone())
    }
}
