use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use tms_core::{Credentials, DomainError, Registration, TenantId, UserRecord};
use tms_gateway::services::AuthApi;
use tms_gateway::{ApiErrorKind, GatewayClient};
use tms_infra::{CredentialStore, PersistedSession};

use crate::outcome::{LoginOutcome, RegisterOutcome};
use crate::state::{AuthState, Session};

pub const LOGIN_FAILED: &str = "Unable to sign in";
pub const REGISTER_FAILED: &str = "Unable to register user";
pub const LOGIN_IN_PROGRESS: &str = "A sign-in is already in progress";

#[derive(Default)]
struct Inner {
    session: Session,
    error: Option<String>,
}

/// Process-wide owner of the authenticated identity.
///
/// Persisted credentials live in the gateway's [`CredentialStore`]; the in-memory
/// [`Session`] mirrors them once bootstrap or login has resolved a user. Locks are never
/// held across an `.await`.
pub struct SessionStore {
    auth: AuthApi,
    store: Arc<dyn CredentialStore>,
    inner: RwLock<Inner>,
    state_tx: watch::Sender<AuthState>,
    login_gate: Mutex<()>,
}

impl SessionStore {
    pub fn new(gateway: GatewayClient) -> Self {
        let store = gateway.store().clone();
        let tenant_id = PersistedSession::new(&*store).tenant_id();
        let (state_tx, _) = watch::channel(AuthState::Uninitialized);

        Self {
            auth: AuthApi::new(gateway),
            store,
            inner: RwLock::new(Inner {
                session: Session::anonymous(tenant_id),
                error: None,
            }),
            state_tx,
            login_gate: Mutex::new(()),
        }
    }

    /// Resume a persisted session if the backend still accepts its token.
    ///
    /// Always settles on a ready state; failures only downgrade to `Unauthenticated`.
    pub async fn bootstrap(&self) -> AuthState {
        self.publish(AuthState::Loading);

        let persisted = self.persisted();
        let tenant_id = persisted.tenant_id();

        let Some(token) = persisted.token() else {
            if persisted.user().is_some() {
                warn!("removing persisted user record without a token");
                if let Err(err) = persisted.remove_user() {
                    warn!(error = %err, "failed to remove stale user record");
                }
            }
            self.reset(tenant_id);
            info!("no persisted session to resume");
            return self.state();
        };

        self.write(|inner| {
            inner.session = Session {
                token: Some(token.clone()),
                ..Session::anonymous(tenant_id.clone())
            };
        });

        match self.auth.me().await {
            Ok(user) => {
                if let Err(err) = persisted.store_user(&user) {
                    warn!(error = %err, "failed to persist user record");
                }
                info!(user = user.display_name(), tenant = %tenant_id, "session resumed");
                self.establish(user, token, tenant_id);
            }
            Err(err) => {
                warn!(error = %err, "persisted session rejected; signing out");
                if let Err(err) = persisted.clear() {
                    warn!(error = %err, "failed to clear persisted credentials");
                }
                self.reset(tenant_id);
            }
        }

        self.state()
    }

    /// Exchange credentials for a token and resolve the user behind it.
    pub async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        let Ok(_gate) = self.login_gate.try_lock() else {
            warn!("login rejected: another sign-in is in flight");
            return LoginOutcome::failure(LOGIN_IN_PROGRESS);
        };

        self.write(|inner| inner.error = None);

        if let Err(err) = credentials.validate() {
            return self.fail_login(validation_message(err));
        }

        let persisted = self.persisted();
        let previous_token = persisted.token();

        let grant = match self.auth.login(credentials).await {
            Ok(grant) => grant,
            Err(err) => {
                warn!(error = %err, "credential exchange failed");
                return self.fail_login(err.user_message(LOGIN_FAILED));
            }
        };

        if let Err(err) = persisted.store_token(&grant.access_token) {
            error!(error = %err, "failed to persist access token");
            return self.fail_login(LOGIN_FAILED.to_string());
        }

        let user = match self.auth.me().await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "could not resolve user after login");
                // A 401 has already been handled by the gateway's global reset.
                if err.kind() != ApiErrorKind::Authorization {
                    if let Err(err) = persisted.restore_token(previous_token.as_deref()) {
                        warn!(error = %err, "failed to restore previous access token");
                    }
                }
                return self.fail_login(err.user_message(LOGIN_FAILED));
            }
        };

        if let Err(err) = persisted.store_user(&user) {
            warn!(error = %err, "failed to persist user record");
        }

        let tenant_id = persisted.tenant_id();
        info!(user = user.display_name(), tenant = %tenant_id, "signed in");
        self.establish(user, grant.access_token, tenant_id);
        LoginOutcome::Success
    }

    /// `POST /auth/register`. Does not sign the new user in.
    pub async fn register(&self, registration: &Registration) -> RegisterOutcome {
        if let Err(err) = registration.validate() {
            let message = validation_message(err);
            self.write(|inner| inner.error = Some(message.clone()));
            return RegisterOutcome::Failure { message };
        }

        match self.auth.register(registration).await {
            Ok(user) => {
                info!(user = user.display_name(), "user registered");
                RegisterOutcome::Registered(user)
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                let message = err.user_message(REGISTER_FAILED);
                self.write(|inner| inner.error = Some(message.clone()));
                RegisterOutcome::Failure { message }
            }
        }
    }

    /// Drop the session locally. No backend call.
    pub fn logout(&self) {
        let persisted = self.persisted();
        if let Err(err) = persisted.clear() {
            warn!(error = %err, "failed to clear persisted credentials");
        }
        self.reset(persisted.tenant_id());
        info!("signed out");
    }

    /// Drop the in-memory session after persisted credentials were cleared elsewhere.
    ///
    /// Storage is left alone. Returns `false` without changing anything when no user is
    /// signed in or when a token has been persisted again since (a newer login).
    pub fn expire(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        let persisted = self.persisted();
        if persisted.token().is_some() {
            debug!("ignoring expiry: a newer credential is persisted");
            return false;
        }
        self.reset(persisted.tenant_id());
        info!("session expired");
        true
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|inner| inner.session.is_authenticated())
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.read(|inner| inner.session.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.read(|inner| inner.session.token.clone())
    }

    pub fn tenant_id(&self) -> TenantId {
        self.read(|inner| inner.session.tenant_id.clone())
    }

    /// Message of the most recent failed login or registration.
    pub fn last_error(&self) -> Option<String> {
        self.read(|inner| inner.error.clone())
    }

    pub fn session(&self) -> Session {
        self.read(|inner| inner.session.clone())
    }

    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    fn persisted(&self) -> PersistedSession<'_> {
        PersistedSession::new(&*self.store)
    }

    fn establish(&self, user: UserRecord, token: String, tenant_id: TenantId) {
        self.write(|inner| {
            inner.session = Session {
                user: Some(user.clone()),
                token: Some(token),
                tenant_id,
                authenticated_at: Some(Utc::now()),
            };
            inner.error = None;
        });
        self.publish(AuthState::Authenticated(user));
    }

    fn reset(&self, tenant_id: TenantId) {
        self.write(|inner| {
            inner.session = Session::anonymous(tenant_id);
            inner.error = None;
        });
        self.publish(AuthState::Unauthenticated);
    }

    fn fail_login(&self, message: String) -> LoginOutcome {
        self.write(|inner| inner.error = Some(message.clone()));
        LoginOutcome::failure(message)
    }

    fn publish(&self, state: AuthState) {
        // `send_replace` updates the value even when nobody is subscribed.
        self.state_tx.send_replace(state);
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut Inner)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.session())
            .field("state", &self.state())
            .finish()
    }
}

fn validation_message(err: DomainError) -> String {
    match err {
        DomainError::Validation(message) => message,
        other => other.to_string(),
    }
}
