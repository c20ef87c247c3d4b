//! `tms-gateway`: the single HTTP pipeline every backend call goes through.
//!
//! Each request is decorated with the persisted bearer token and tenant header before it
//! leaves, and every 401 coming back resets the persisted session and emits a
//! [`GatewayEvent::SessionExpired`] for the application shell.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod interceptor;
pub mod services;

pub use client::{GatewayClient, GatewayRequest};
pub use config::GatewayConfig;
pub use error::{ApiError, ApiErrorKind, extract_message};
pub use events::GatewayEvent;
pub use interceptor::AuthPolicy;
pub use services::{QueryParams, Resource, Services};
