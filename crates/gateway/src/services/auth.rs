use serde::Deserialize;
use serde_json::Value;

use tms_core::{Credentials, Registration, UserRecord};

use crate::client::GatewayClient;
use crate::error::ApiError;
use crate::interceptor::AuthPolicy;

/// Token issued by the login endpoint.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl core::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Authentication endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    gateway: GatewayClient,
}

impl AuthApi {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }

    /// `POST /auth/login`, form-encoded. A 401 here is bad credentials, not an expired
    /// session, so the call opts out of the global session reset.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenGrant, ApiError> {
        let grant: TokenGrant = self
            .gateway
            .post("/auth/login")
            .form(&credentials.form_fields()[..])
            .policy(AuthPolicy::CredentialExchange)
            .send_json()
            .await?;

        if grant.access_token.trim().is_empty() {
            return Err(ApiError::Decode("login response carried an empty access_token".into()));
        }
        Ok(grant)
    }

    /// `GET /auth/me` with whatever token is currently persisted.
    pub async fn me(&self) -> Result<UserRecord, ApiError> {
        let payload: Value = self.gateway.get("/auth/me").send_json().await?;
        UserRecord::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `POST /auth/register`.
    pub async fn register(&self, registration: &Registration) -> Result<UserRecord, ApiError> {
        let payload: Value = self
            .gateway
            .post("/auth/register")
            .json(registration)
            .send_json()
            .await?;
        UserRecord::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
