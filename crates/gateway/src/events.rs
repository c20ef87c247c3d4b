//! Session events emitted by the gateway.
//!
//! The gateway never navigates by itself: it publishes on a lossy broadcast channel and
//! the application shell decides what to do (log out, redirect). Publishing with no
//! subscriber is not an error.

/// Something the application shell must react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A call was answered with 401. Persisted credentials have already been cleared.
    SessionExpired {
        /// Path of the call that triggered the reset.
        endpoint: String,
        /// Login entry point the shell should navigate to.
        redirect_to: String,
    },
}

impl GatewayEvent {
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GatewayEvent::SessionExpired { redirect_to, .. } => Some(redirect_to),
        }
    }
}
