//! Application shell: owns the session, the current location and the one subscriber to
//! gateway session events.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{Notify, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tms_core::Credentials;
use tms_gateway::{GatewayEvent, Services};
use tms_session::{AuthState, LoginOutcome, SessionStore};

use crate::navigation::{self, DASHBOARD};

struct Shared {
    session: Arc<SessionStore>,
    services: Services,
    login_path: String,
    location: watch::Sender<String>,
    expirations: AtomicUsize,
    shutdown: Notify,
}

impl Shared {
    fn force_login(&self) {
        self.session.logout();
        self.location.send_replace(self.login_path.clone());
    }

    /// The gateway has already cleared storage; only memory and location change here.
    fn expire(&self, redirect_to: &str) {
        if self.session.expire() {
            self.expirations.fetch_add(1, Ordering::SeqCst);
            self.location.send_replace(redirect_to.to_string());
        }
    }
}

pub struct AppShell {
    shared: Arc<Shared>,
    listener: Option<JoinHandle<()>>,
}

impl AppShell {
    /// Wire the shell and start listening for session events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(session: Arc<SessionStore>, services: Services) -> Self {
        let gateway = services.gateway();
        let login_path = gateway.login_path().to_string();
        let events = gateway.subscribe();
        let (location, _) = watch::channel("/".to_string());

        let shared = Arc::new(Shared {
            session,
            services,
            login_path,
            location,
            expirations: AtomicUsize::new(0),
            shutdown: Notify::new(),
        });
        let listener = tokio::spawn(listen(shared.clone(), events));

        Self {
            shared,
            listener: Some(listener),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.shared.session
    }

    pub fn services(&self) -> &Services {
        &self.shared.services
    }

    pub fn location(&self) -> String {
        self.shared.location.borrow().clone()
    }

    pub fn watch_location(&self) -> watch::Receiver<String> {
        self.shared.location.subscribe()
    }

    /// Session expirations the shell has acted on.
    pub fn expirations(&self) -> usize {
        self.shared.expirations.load(Ordering::SeqCst)
    }

    /// Bootstrap the session, then land on `requested` (or wherever the guard sends us).
    pub async fn start(&self, requested: &str) -> AuthState {
        let state = self.shared.session.bootstrap().await;
        self.navigate(requested);
        state
    }

    pub fn navigate(&self, requested: &str) -> String {
        let state = self.shared.session.state();
        let target = navigation::resolve(requested, &state, &self.shared.login_path);
        if target != requested {
            debug!(requested, target = %target, "route guard redirected");
        }
        self.shared.location.send_replace(target.clone());
        target
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> LoginOutcome {
        let outcome = self.shared.session.login(credentials).await;
        if outcome.is_success() {
            self.navigate(DASHBOARD);
        }
        outcome
    }

    pub fn sign_out(&self) {
        self.shared.force_login();
    }

    /// Stop the event listener and wait for it to finish.
    pub async fn shutdown(mut self) {
        self.shared.shutdown.notify_one();
        if let Some(listener) = self.listener.take() {
            if let Err(err) = listener.await {
                warn!(error = %err, "session listener ended abnormally");
            }
        }
    }
}

impl Drop for AppShell {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

async fn listen(shared: Arc<Shared>, mut events: broadcast::Receiver<GatewayEvent>) {
    loop {
        tokio::select! {
            _ = shared.shutdown.notified() => {
                debug!("session listener shutting down");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    let queued = drain(&mut events);
                    let redirect_to = event
                        .redirect_target()
                        .unwrap_or(shared.login_path.as_str());
                    info!(?event, queued, "session expired; returning to login");
                    shared.expire(redirect_to);
                }
                // Every event is a reset, so acting once covers whatever was missed.
                Err(RecvError::Lagged(missed)) => {
                    let queued = drain(&mut events);
                    warn!(missed, queued, "session listener lagged; expiring session");
                    shared.expire(&shared.login_path);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// Discard events already queued behind the one being handled. Returns how many.
fn drain(events: &mut broadcast::Receiver<GatewayEvent>) -> u64 {
    let mut queued = 0;
    loop {
        match events.try_recv() {
            Ok(_) => queued += 1,
            Err(TryRecvError::Lagged(missed)) => queued += missed,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return queued,
        }
    }
}
