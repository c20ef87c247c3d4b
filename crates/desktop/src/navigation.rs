//! Route guard.

use tms_session::AuthState;

pub const DASHBOARD: &str = "/dashboard";

/// Where a request for `requested` actually lands given the current auth state.
///
/// - signed out: every page except the login page goes to the login page
/// - signed in: the login page and the root go to the dashboard
/// - still bootstrapping: the request is kept so it can be resolved once ready
pub fn resolve(requested: &str, state: &AuthState, login_path: &str) -> String {
    let requested = normalize(requested);

    if !state.is_ready() {
        return requested;
    }

    let on_login = requested == login_path;
    if state.is_authenticated() {
        if on_login || requested == "/" {
            return DASHBOARD.to_string();
        }
        requested
    } else if on_login {
        requested
    } else {
        login_path.to_string()
    }
}

fn normalize(path: &str) -> String {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
