//! Process-wide logging setup shared by the console binary and its tests.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Install the tracing subscriber with the format selected by `TMS_LOG_FORMAT`.
///
/// Safe to call multiple times; only the first call installs anything.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
