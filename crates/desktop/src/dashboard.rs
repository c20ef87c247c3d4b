//! Dashboard data loading.
//!
//! The four calls are independent, so they run concurrently; each failure is logged and
//! replaced by an empty value instead of failing the whole page.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use tms_core::{Client, DashboardStats, Driver};
use tms_gateway::{ApiError, QueryParams, Services};

/// Upper bound for the side lists on the overview page.
const LIST_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub stats: DashboardStats,
    pub recent_trips: Vec<Value>,
    pub clients: Vec<Client>,
    pub drivers: Vec<Driver>,
    /// Completed trips as a percentage of all trips.
    pub completion_rate: f64,
    /// Active drivers whose licence is past its expiry date.
    pub expired_licences: usize,
    /// Names of the calls that fell back.
    pub degraded: Vec<&'static str>,
}

impl Overview {
    fn summarize(&mut self, today: NaiveDate) {
        self.completion_rate = self.stats.completion_rate();
        self.expired_licences = self
            .drivers
            .iter()
            .filter(|d| d.is_active && d.licence_expired_on(today))
            .count();
    }
}

pub async fn load_overview(services: &Services) -> Overview {
    let params = QueryParams::new().page(0, LIST_LIMIT);
    let dashboard = services.dashboard();
    let clients = services.clients();
    let drivers = services.drivers();

    let (stats, recent_trips, clients, drivers) = tokio::join!(
        dashboard.stats(),
        dashboard.recent_trips(),
        clients.list(&params),
        drivers.list(&params),
    );

    let mut overview = Overview::default();
    overview.stats = or_fallback("dashboard stats", stats, &mut overview.degraded);
    overview.recent_trips = or_fallback("recent trips", recent_trips, &mut overview.degraded);
    overview.clients = or_fallback("clients", clients, &mut overview.degraded);
    overview.drivers = or_fallback("drivers", drivers, &mut overview.degraded);
    overview.summarize(Utc::now().date_naive());
    overview
}

fn or_fallback<T: Default>(
    what: &'static str,
    result: Result<T, ApiError>,
    degraded: &mut Vec<&'static str>,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(call = what, error = %err, "dashboard call failed; using empty fallback");
            degraded.push(what);
            T::default()
        }
    }
}
