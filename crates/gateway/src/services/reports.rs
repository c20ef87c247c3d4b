use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tms_core::{ClientId, DriverId, VehicleId};

use crate::client::GatewayClient;
use crate::error::ApiError;
use crate::services::resource::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Trips,
    Maintenance,
    Financial,
    Profitability,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Trips => "trips",
            ReportKind::Maintenance => "maintenance",
            ReportKind::Financial => "financial",
            ReportKind::Profitability => "profitability",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Excel,
}

/// Asynchronous report generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRequest {
    pub report_type: ReportKind,
    pub format: ReportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<VehicleId>,
}

impl ReportRequest {
    pub fn new(report_type: ReportKind, format: ReportFormat) -> Self {
        Self {
            report_type,
            format,
            start_date: None,
            end_date: None,
            client_id: None,
            driver_id: None,
            vehicle_id: None,
        }
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

/// Progress of a generated report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportStatus {
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Reports {
    gateway: GatewayClient,
}

impl Reports {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }

    pub async fn financial(&self, params: &QueryParams) -> Result<Value, ApiError> {
        self.gateway
            .get("/reports/financial")
            .query(&params.to_query())
            .send_json()
            .await
    }

    pub async fn operational(&self, params: &QueryParams) -> Result<Value, ApiError> {
        self.gateway
            .get("/reports/operational")
            .query(&params.to_query())
            .send_json()
            .await
    }

    /// Raw PDF bytes of `GET /reports/{kind}/pdf`.
    pub async fn export_pdf(
        &self,
        kind: ReportKind,
        params: &QueryParams,
    ) -> Result<Vec<u8>, ApiError> {
        self.export(kind, "pdf", params).await
    }

    /// Raw spreadsheet bytes of `GET /reports/{kind}/excel`.
    pub async fn export_excel(
        &self,
        kind: ReportKind,
        params: &QueryParams,
    ) -> Result<Vec<u8>, ApiError> {
        self.export(kind, "excel", params).await
    }

    pub async fn generate(&self, request: &ReportRequest) -> Result<ReportStatus, ApiError> {
        self.gateway
            .post("/reports/generate")
            .json(request)
            .send_json()
            .await
    }

    pub async fn status(&self, task_id: &str) -> Result<ReportStatus, ApiError> {
        self.gateway
            .get(&format!("/reports/status/{}", urlencoding::encode(task_id)))
            .send_json()
            .await
    }

    async fn export(
        &self,
        kind: ReportKind,
        format: &str,
        params: &QueryParams,
    ) -> Result<Vec<u8>, ApiError> {
        self.gateway
            .get(&format!("/reports/{}/{}", kind.as_str(), format))
            .query(&params.to_query())
            .send_bytes()
            .await
    }
}
