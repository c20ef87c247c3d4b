use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;

use tms_core::Credentials;
use tms_desktop::navigation::DASHBOARD;
use tms_desktop::{AppShell, ShellConfig, load_overview};
use tms_gateway::{GatewayClient, QueryParams, Services};
use tms_infra::{CredentialStore, FileStore, MemoryStore, StorageError, keys};
use tms_session::SessionStore;

struct Backend {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Backend {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { base_url, handle }
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Backend whose token is valid until `revoked` flips.
fn backend(revoked: Arc<AtomicBool>) -> Router {
    Router::new()
        .route(
            "/auth/login",
            post(|| async { Json(json!({ "access_token": "abc", "token_type": "bearer" })) }),
        )
        .route(
            "/auth/me",
            get(|| async { Json(json!({ "id": 1, "username": "admin", "full_name": "Admin" })) }),
        )
        .route("/clients", get(clients))
        .with_state(revoked)
}

async fn clients(State(revoked): State<Arc<AtomicBool>>) -> Response {
    if revoked.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Token has been revoked" })),
        )
            .into_response();
    }
    Json(json!([])).into_response()
}

struct Harness {
    shell: AppShell,
    store: Arc<FileStore>,
    _dir: tempfile::TempDir,
}

fn harness(base_url: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = ShellConfig {
        api_url: base_url.to_string(),
        data_dir: Some(dir.path().to_path_buf()),
        ..ShellConfig::default()
    };
    let store = Arc::new(config.open_store().unwrap());
    let gateway = GatewayClient::new(config.gateway_config(), store.clone()).unwrap();
    let services = Services::new(gateway.clone());
    let session = Arc::new(SessionStore::new(gateway));
    Harness {
        shell: AppShell::new(session, services),
        store,
        _dir: dir,
    }
}

/// Memory store that counts token removals.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    token_removals: AtomicUsize,
}

impl CredentialStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if key == keys::ACCESS_TOKEN {
            self.token_removals.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.remove(key)
    }
}

fn counting_shell(base_url: &str) -> (AppShell, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let config = ShellConfig {
        api_url: base_url.to_string(),
        ..ShellConfig::default()
    };
    let gateway = GatewayClient::new(config.gateway_config(), store.clone()).unwrap();
    let services = Services::new(gateway.clone());
    let session = Arc::new(SessionStore::new(gateway));
    (AppShell::new(session, services), store)
}

#[tokio::test]
async fn guard_sends_signed_out_users_to_login_and_back() {
    let backend = Backend::spawn(backend(Arc::new(AtomicBool::new(false)))).await;
    let h = harness(&backend.base_url);

    h.shell.start("/clients").await;
    assert_eq!(h.shell.location(), "/login");

    let outcome = h.shell.sign_in(&Credentials::new("admin", "admin123")).await;
    assert!(outcome.is_success());
    assert_eq!(h.shell.location(), DASHBOARD);
    assert_eq!(h.shell.navigate("/login"), DASHBOARD);
    assert_eq!(h.shell.navigate("/clients"), "/clients");

    h.shell.sign_out();
    assert_eq!(h.shell.location(), "/login");
    assert_eq!(h.store.get(keys::ACCESS_TOKEN).unwrap(), None);
}

#[tokio::test]
async fn revoked_token_logs_out_and_redirects_to_login() {
    let revoked = Arc::new(AtomicBool::new(false));
    let backend = Backend::spawn(backend(revoked.clone())).await;
    let h = harness(&backend.base_url);

    assert!(h.shell.sign_in(&Credentials::new("admin", "admin123")).await.is_success());
    h.shell.navigate("/clients");
    let mut location = h.shell.watch_location();

    revoked.store(true, Ordering::SeqCst);
    let err = h
        .shell
        .services()
        .clients()
        .list(&QueryParams::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    tokio::time::timeout(Duration::from_secs(2), location.changed())
        .await
        .expect("redirect within two seconds")
        .unwrap();
    assert_eq!(*location.borrow(), "/login");
    assert!(!h.shell.session().is_authenticated());
    assert_eq!(h.store.get(keys::ACCESS_TOKEN).unwrap(), None);
    assert_eq!(h.store.get(keys::USER).unwrap(), None);

    h.shell.shutdown().await;
}

#[tokio::test]
async fn session_survives_restart_through_the_file_store() {
    let backend = Backend::spawn(backend(Arc::new(AtomicBool::new(false)))).await;
    let dir = tempfile::tempdir().unwrap();
    let config = ShellConfig {
        api_url: backend.base_url.clone(),
        data_dir: Some(dir.path().to_path_buf()),
        ..ShellConfig::default()
    };

    let first_run = {
        let store = Arc::new(config.open_store().unwrap());
        let gateway = GatewayClient::new(config.gateway_config(), store).unwrap();
        SessionStore::new(gateway)
    };
    assert!(first_run.login(&Credentials::new("admin", "admin123")).await.is_success());
    drop(first_run);

    let store = Arc::new(config.open_store().unwrap());
    let gateway = GatewayClient::new(config.gateway_config(), store).unwrap();
    let second_run = SessionStore::new(gateway);
    let state = second_run.bootstrap().await;

    assert!(state.is_authenticated());
    assert_eq!(second_run.token().as_deref(), Some("abc"));
    assert_eq!(
        second_run.current_user().map(|u| u.display_name().to_string()),
        Some("Admin".to_string())
    );
}

#[tokio::test]
async fn overview_falls_back_per_call() {
    let backend = Backend::spawn(
        Router::new()
            .route(
                "/dashboard/stats",
                get(|| async {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "boom" })))
                }),
            )
            .route(
                "/dashboard/recent-trips",
                get(|| async { Json(json!([{ "id": 1, "status": "planned" }])) }),
            )
            .route("/clients", get(|| async { Json(json!([])) }))
            .route(
                "/drivers",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            ),
    )
    .await;
    let h = harness(&backend.base_url);

    let overview = load_overview(h.shell.services()).await;

    assert_eq!(overview.stats.total_trips, 0);
    assert_eq!(overview.recent_trips.len(), 1);
    assert!(overview.clients.is_empty());
    assert!(overview.drivers.is_empty());
    assert_eq!(overview.degraded, vec!["dashboard stats", "drivers"]);
    // Non-401 failures leave the session alone.
    assert_eq!(h.shell.location(), "/");
}

#[tokio::test]
async fn one_unauthorized_response_clears_storage_once() {
    let revoked = Arc::new(AtomicBool::new(false));
    let backend = Backend::spawn(backend(revoked.clone())).await;
    let (shell, store) = counting_shell(&backend.base_url);

    assert!(shell.sign_in(&Credentials::new("admin", "admin123")).await.is_success());
    let mut location = shell.watch_location();

    revoked.store(true, Ordering::SeqCst);
    shell.services().clients().list(&QueryParams::new()).await.unwrap_err();

    tokio::time::timeout(Duration::from_secs(2), location.changed())
        .await
        .expect("redirect within two seconds")
        .unwrap();
    // Let the listener finish whatever it was doing.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(shell.location(), "/login");
    assert!(!shell.session().is_authenticated());
    assert_eq!(store.token_removals.load(Ordering::SeqCst), 1);
    assert_eq!(shell.expirations(), 1);
}

#[tokio::test]
async fn burst_of_unauthorized_responses_expires_once() {
    let revoked = Arc::new(AtomicBool::new(false));
    let backend = Backend::spawn(backend(revoked.clone())).await;
    let (shell, _store) = counting_shell(&backend.base_url);

    assert!(shell.sign_in(&Credentials::new("admin", "admin123")).await.is_success());
    let mut location = shell.watch_location();

    revoked.store(true, Ordering::SeqCst);
    let clients = shell.services().clients();
    let params = QueryParams::new();
    let (a, b, c, d) = tokio::join!(
        clients.list(&params),
        clients.list(&params),
        clients.list(&params),
        clients.list(&params),
    );
    assert!([a, b, c, d].iter().all(|r| r.as_ref().is_err_and(|e| e.status() == Some(401))));

    tokio::time::timeout(Duration::from_secs(2), location.changed())
        .await
        .expect("redirect within two seconds")
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(shell.location(), "/login");
    assert_eq!(shell.expirations(), 1);
}

#[tokio::test]
async fn login_after_expiry_is_not_undone_by_late_events() {
    let revoked = Arc::new(AtomicBool::new(false));
    let backend = Backend::spawn(backend(revoked.clone())).await;
    let (shell, store) = counting_shell(&backend.base_url);

    assert!(shell.sign_in(&Credentials::new("admin", "admin123")).await.is_success());
    revoked.store(true, Ordering::SeqCst);
    shell.services().clients().list(&QueryParams::new()).await.unwrap_err();

    // Sign in again before the listener has had a chance to run.
    assert!(shell.sign_in(&Credentials::new("admin", "admin123")).await.is_success());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(shell.session().is_authenticated());
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("abc"));
    assert_eq!(shell.location(), DASHBOARD);
}
