//! Read models for the transport-management resources the console displays.
//!
//! These mirror the backend's response shapes closely enough for listing and display.
//! Fields the console does not use (timestamps, relations) are ignored on decode.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{ClientId, DriverId, VehicleId};

/// A shipper the company transports cargo for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub document: String,
    pub contact_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    /// National driving licence number.
    pub cnh_number: String,
    pub cnh_expiry: NaiveDate,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Driver {
    pub fn licence_expired_on(&self, day: NaiveDate) -> bool {
        self.cnh_expiry < day
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate: String,
    pub model: String,
    pub brand: String,
    pub year: i32,
    pub capacity: f64,
    pub fuel_type: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Lifecycle of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Planned,
    InTransit,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Planned => "planned",
            TripStatus::InTransit => "in_transit",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline numbers for the dashboard.
///
/// Every field defaults, so a zeroed value doubles as the placeholder shown when the
/// stats call fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_trips: u64,
    pub planned_trips: u64,
    pub in_transit_trips: u64,
    pub completed_trips: u64,
    pub cancelled_trips: u64,
    pub total_clients: u64,
    pub total_drivers: u64,
    pub total_vehicles: u64,
    pub total_routes: u64,
    pub total_estimated_costs: f64,
    pub total_actual_costs: f64,
    pub recent_trips: Vec<Value>,
}

impl DashboardStats {
    /// Share of trips completed, in percent. Zero when there are no trips.
    pub fn completion_rate(&self) -> f64 {
        if self.total_trips == 0 {
            return 0.0;
        }
        self.completed_trips as f64 * 100.0 / self.total_trips as f64
    }
}

fn default_true() -> bool {
    true
}
