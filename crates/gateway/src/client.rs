//! The shared, configured HTTP client.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use tms_infra::{CredentialStore, PersistedSession};

use crate::config::GatewayConfig;
use crate::error::{ApiError, extract_message};
use crate::events::GatewayEvent;
use crate::interceptor::{self, AuthPolicy, Verdict};

struct Inner {
    http: reqwest::Client,
    base_url: String,
    login_path: String,
    store: Arc<dyn CredentialStore>,
    events: broadcast::Sender<GatewayEvent>,
}

/// Single request pipeline for every backend call.
///
/// Cheap to clone; all clones share the HTTP connection pool, the credential store and the
/// event channel.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<Inner>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("tms-console/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Transport)?;

        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.normalized_base_url(),
                login_path: config.login_path,
                store,
                events,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn login_path(&self) -> &str {
        &self.inner.login_path
    }

    /// Credential store the interceptors read from and the session store writes to.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Subscribe to session events. Events published before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.events.subscribe()
    }

    pub fn request(&self, method: Method, path: &str) -> GatewayRequest {
        let path = normalize_path(path);
        let url = format!("{}{}", self.inner.base_url, path);
        GatewayRequest {
            client: self.clone(),
            builder: self.inner.http.request(method.clone(), url),
            method,
            path,
            policy: AuthPolicy::Enforce,
        }
    }

    pub fn get(&self, path: &str) -> GatewayRequest {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> GatewayRequest {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> GatewayRequest {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> GatewayRequest {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> GatewayRequest {
        self.request(Method::DELETE, path)
    }

    /// Inbound interceptor: pass successes through, reset the session on 401, turn
    /// everything else into [`ApiError::Rejected`].
    async fn intercept(
        &self,
        endpoint: &str,
        policy: AuthPolicy,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        match interceptor::classify(status, policy) {
            Verdict::Pass => Ok(response),
            Verdict::ExpireSession => {
                self.expire_session(endpoint);
                Err(ApiError::Unauthorized {
                    endpoint: endpoint.to_string(),
                })
            }
            Verdict::Reject => {
                let body = response
                    .bytes()
                    .await
                    .ok()
                    .and_then(|raw| serde_json::from_slice::<Value>(&raw).ok());
                let message = body.as_ref().and_then(extract_message);
                tracing::debug!(
                    endpoint,
                    status = status.as_u16(),
                    message = message.as_deref().unwrap_or(""),
                    "backend rejected request"
                );
                Err(ApiError::Rejected {
                    status: status.as_u16(),
                    message,
                    body,
                })
            }
        }
    }

    fn expire_session(&self, endpoint: &str) {
        if let Err(err) = PersistedSession::new(&*self.inner.store).clear() {
            tracing::error!(error = %err, "failed to clear persisted session after 401");
        }

        tracing::warn!(
            endpoint,
            redirect_to = %self.inner.login_path,
            "received 401; session cleared"
        );

        // No subscribers is fine: nothing to redirect.
        let _ = self.inner.events.send(GatewayEvent::SessionExpired {
            endpoint: endpoint.to_string(),
            redirect_to: self.inner.login_path.clone(),
        });
    }
}

impl core::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.inner.base_url)
            .field("login_path", &self.inner.login_path)
            .finish_non_exhaustive()
    }
}

/// A request being prepared against the gateway.
///
/// Identity headers are attached at [`send`](Self::send) time, so they always reflect the
/// credential persisted at that moment.
pub struct GatewayRequest {
    client: GatewayClient,
    method: Method,
    path: String,
    builder: reqwest::RequestBuilder,
    policy: AuthPolicy,
}

impl GatewayRequest {
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    pub fn form<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.builder = self.builder.form(body);
        self
    }

    pub fn policy(mut self, policy: AuthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn send(self) -> Result<reqwest::Response, ApiError> {
        let GatewayRequest {
            client,
            method,
            path,
            builder,
            policy,
        } = self;

        let headers = interceptor::identity_headers(&PersistedSession::new(&*client.inner.store));
        tracing::debug!(
            %method,
            path = %path,
            authenticated = headers.contains_key(AUTHORIZATION),
            "sending request"
        );

        let response = builder
            .headers(headers)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        client.intercept(&path, policy, response).await
    }

    /// Send and decode the JSON body. An empty body decodes as `null`.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let raw = self.send_bytes().await?;
        decode(&raw)
    }

    pub async fn send_bytes(self) -> Result<Vec<u8>, ApiError> {
        let response = self.send().await?;
        let raw = response.bytes().await.map_err(ApiError::Transport)?;
        Ok(raw.to_vec())
    }
}

fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, ApiError> {
    let raw: &[u8] = if raw.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        raw
    };
    serde_json::from_slice(raw).map_err(|e| ApiError::Decode(e.to_string()))
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tms_infra::MemoryStore;

    #[test]
    fn paths_are_joined_onto_base_url() {
        let gateway = GatewayClient::new(
            GatewayConfig::new("http://backend.test/api/v1/"),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        assert_eq!(gateway.base_url(), "http://backend.test/api/v1");
        assert_eq!(normalize_path("clients"), "/clients");
        assert_eq!(normalize_path("/auth/me"), "/auth/me");
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let value: Value = decode(b"").unwrap();
        assert_eq!(value, Value::Null);
        let value: Option<u32> = decode(b"  \n").unwrap();
        assert_eq!(value, None);
        assert!(matches!(decode::<u32>(b"{"), Err(ApiError::Decode(_))));
    }
}
