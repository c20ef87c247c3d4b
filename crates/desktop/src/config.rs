//! Shell configuration from `TMS_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use tms_core::{Credentials, TenantId};
use tms_gateway::GatewayConfig;
use tms_gateway::config::{DEFAULT_BASE_URL, DEFAULT_LOGIN_PATH};
use tms_infra::FileStore;

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub api_url: String,
    /// Directory holding `session.json`; the OS data directory when unset.
    pub data_dir: Option<PathBuf>,
    /// Tenant to seed when none has been persisted yet.
    pub tenant_id: Option<TenantId>,
    pub login_path: String,
    pub request_timeout: Option<Duration>,
    /// Non-interactive sign-in (`TMS_USERNAME` / `TMS_PASSWORD`).
    pub login: Option<Credentials>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            data_dir: None,
            tenant_id: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            request_timeout: None,
            login: None,
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let request_timeout = match var("TMS_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("TMS_REQUEST_TIMEOUT_SECS must be whole seconds, got {raw:?}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let login = match (var("TMS_USERNAME"), var("TMS_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            _ => anyhow::bail!("TMS_USERNAME and TMS_PASSWORD must be set together"),
        };

        Ok(Self {
            api_url: var("TMS_API_URL").unwrap_or(defaults.api_url),
            data_dir: var("TMS_DATA_DIR").map(PathBuf::from),
            tenant_id: var("TMS_TENANT_ID").map(TenantId::new),
            login_path: var("TMS_LOGIN_PATH").unwrap_or(defaults.login_path),
            request_timeout,
            login,
        })
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        let config = GatewayConfig::new(&self.api_url).with_login_path(&self.login_path);
        match self.request_timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }

    pub fn open_store(&self) -> anyhow::Result<FileStore> {
        match &self.data_dir {
            Some(dir) => FileStore::open_in(dir)
                .with_context(|| format!("opening credential store in {}", dir.display())),
            None => FileStore::open_default().context("opening default credential store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ShellConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
        assert_eq!(config.login_path, "/login");
        assert!(config.request_timeout.is_none());
        assert!(config.login.is_none());
        assert!(config.tenant_id.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = ShellConfig::from_lookup(lookup(&[
            ("TMS_API_URL", "https://tms.example.com/api/v1"),
            ("TMS_TENANT_ID", "acme"),
            ("TMS_REQUEST_TIMEOUT_SECS", "15"),
            ("TMS_USERNAME", "admin"),
            ("TMS_PASSWORD", "admin123"),
            ("TMS_LOGIN_PATH", "  "),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://tms.example.com/api/v1");
        assert_eq!(config.tenant_id, Some(TenantId::new("acme")));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.login.as_ref().map(|c| c.username.as_str()), Some("admin"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ShellConfig::from_lookup(lookup(&[("TMS_REQUEST_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ShellConfig::from_lookup(lookup(&[("TMS_USERNAME", "admin")])).is_err());
    }
}
