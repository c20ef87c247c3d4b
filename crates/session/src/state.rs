use chrono::{DateTime, Utc};

use tms_core::{TenantId, UserRecord};

/// Authentication state as observed by consumers.
///
/// Lifecycle: `Uninitialized` until bootstrap starts, `Loading` while the persisted
/// credential is checked, then one of the two ready states.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Uninitialized,
    Loading,
    Authenticated(UserRecord),
    Unauthenticated,
}

impl AuthState {
    /// Bootstrap (or a login/logout) has settled the state.
    pub fn is_ready(&self) -> bool {
        matches!(self, AuthState::Authenticated(_) | AuthState::Unauthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// In-memory session.
///
/// `token` and `user` are either both present or both absent, except while bootstrap is
/// validating a persisted token.
#[derive(Clone, PartialEq, Default)]
pub struct Session {
    pub user: Option<UserRecord>,
    pub token: Option<String>,
    pub tenant_id: TenantId,
    pub authenticated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.as_ref().map(UserRecord::display_name))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("tenant_id", &self.tenant_id)
            .field("authenticated_at", &self.authenticated_at)
            .finish()
    }
}
