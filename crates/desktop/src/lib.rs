//! `tms-desktop`
//!
//! **Responsibility:** headless application shell for the TMS console.
//!
//! This crate provides:
//! - Environment configuration and credential-store wiring
//! - The route guard (login vs. protected pages)
//! - The single subscriber that turns a gateway session-expired event into a logout
//!   and a redirect
//! - Dashboard loading with per-call fallbacks

pub mod config;
pub mod dashboard;
pub mod navigation;
pub mod shell;

pub use config::ShellConfig;
pub use dashboard::{Overview, load_overview};
pub use shell::AppShell;
