//! Outbound and inbound request interceptors.
//!
//! Both halves are plain functions over persisted state and status codes so they can be
//! exercised without a network.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use tms_core::TenantId;
use tms_infra::PersistedSession;

/// Header scoping every request to one tenant.
pub const TENANT_HEADER: HeaderName = HeaderName::from_static("x-tenant-id");

/// How a call treats a 401 answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// 401 means the session is invalid: clear it and emit a session-expired event.
    #[default]
    Enforce,
    /// The call exchanges credentials for a token; 401 means "bad credentials" and is
    /// reported to the caller like any other rejection.
    CredentialExchange,
}

/// What the inbound interceptor decided for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the response to the caller unchanged.
    Pass,
    /// Reset the session and fail the call as unauthorized.
    ExpireSession,
    /// Fail the call with the backend's error payload.
    Reject,
}

/// Headers attached to every outbound request.
///
/// `Authorization: Bearer <token>` when a token is persisted; `X-Tenant-ID` always, with
/// the default tenant when none is persisted.
pub fn identity_headers(persisted: &PersistedSession<'_>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(2);

    if let Some(token) = persisted.token() {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("persisted token is not a valid header value; sending anonymously");
            }
        }
    }

    let tenant = persisted.tenant_id();
    let tenant_value = HeaderValue::from_str(tenant.as_str()).unwrap_or_else(|_| {
        tracing::warn!(tenant = %tenant, "persisted tenant is not a valid header value; using default");
        HeaderValue::from_static(TenantId::DEFAULT)
    });
    headers.insert(TENANT_HEADER, tenant_value);

    headers
}

/// Classify a response status under the call's auth policy.
pub fn classify(status: StatusCode, policy: AuthPolicy) -> Verdict {
    if status.is_success() {
        Verdict::Pass
    } else if status == StatusCode::UNAUTHORIZED && policy == AuthPolicy::Enforce {
        Verdict::ExpireSession
    } else {
        Verdict::Reject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tms_infra::{CredentialStore, MemoryStore, keys};

    #[test]
    fn anonymous_request_gets_default_tenant_only() {
        let store = MemoryStore::new();
        let headers = identity_headers(&PersistedSession::new(&store));

        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(TENANT_HEADER).unwrap(), "default");
    }

    #[test]
    fn token_and_tenant_are_attached() {
        let store = MemoryStore::with_entries([(keys::ACCESS_TOKEN, "abc"), (keys::TENANT_ID, "acme")]);
        let headers = identity_headers(&PersistedSession::new(&store));

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(TENANT_HEADER).unwrap(), "acme");
    }

    #[test]
    fn unencodable_values_degrade() {
        let store = MemoryStore::new();
        store.set(keys::ACCESS_TOKEN, "bad\ntoken").unwrap();
        store.set(keys::TENANT_ID, "bad\ntenant").unwrap();
        let headers = identity_headers(&PersistedSession::new(&store));

        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(TENANT_HEADER).unwrap(), "default");
    }

    #[test]
    fn classification() {
        assert_eq!(classify(StatusCode::OK, AuthPolicy::Enforce), Verdict::Pass);
        assert_eq!(classify(StatusCode::NO_CONTENT, AuthPolicy::Enforce), Verdict::Pass);
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, AuthPolicy::Enforce),
            Verdict::ExpireSession
        );
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, AuthPolicy::CredentialExchange),
            Verdict::Reject
        );
        assert_eq!(classify(StatusCode::FORBIDDEN, AuthPolicy::Enforce), Verdict::Reject);
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, AuthPolicy::Enforce),
            Verdict::Reject
        );
    }
}
