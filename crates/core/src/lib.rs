//! `tms-core`: shared domain primitives for the transport-management client.
//!
//! This crate contains **pure domain** types (no HTTP, no storage).

pub mod credentials;
pub mod error;
pub mod fleet;
pub mod id;
pub mod user;

pub use credentials::{Credentials, Registration};
pub use error::{DomainError, DomainResult};
pub use fleet::{Client, DashboardStats, Driver, TripStatus, Vehicle};
pub use id::{ClientId, DriverId, MaintenanceId, RouteId, TenantId, TripId, VehicleId};
pub use user::UserRecord;
