use std::time::Duration;

/// Default backend root, API version prefix included.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Where the shell sends the user after the session is invalidated.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Gateway client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Backend root; resource paths are appended to it.
    pub base_url: String,

    /// Login entry point carried by session-expired events.
    pub login_path: String,

    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// Buffered session events per subscriber before older ones are dropped.
    pub event_capacity: usize,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL without trailing slashes.
    pub(crate) fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            timeout: None,
            event_capacity: 16,
        }
    }
}
