//! Headless console entry point.
//!
//! Resumes the persisted session (or signs in with `TMS_USERNAME`/`TMS_PASSWORD`) and
//! prints the dashboard overview as JSON.

use std::sync::Arc;

use anyhow::Context;

use tms_desktop::navigation::DASHBOARD;
use tms_desktop::{AppShell, ShellConfig, load_overview};
use tms_gateway::{GatewayClient, Services};
use tms_infra::PersistedSession;
use tms_session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tms_observability::init();

    let config = ShellConfig::from_env()?;
    let store = Arc::new(config.open_store()?);
    tracing::info!(path = %store.path().display(), api_url = %config.api_url, "starting console");

    if let Some(tenant_id) = &config.tenant_id {
        let seeded = PersistedSession::new(store.as_ref())
            .seed_tenant(tenant_id)
            .context("seeding tenant")?;
        if seeded {
            tracing::info!(tenant = %tenant_id, "tenant seeded");
        }
    }

    let gateway = GatewayClient::new(config.gateway_config(), store)
        .context("building gateway client")?;
    let services = Services::new(gateway.clone());
    let session = Arc::new(SessionStore::new(gateway));
    let shell = AppShell::new(session.clone(), services);

    let state = shell.start(DASHBOARD).await;
    if !state.is_authenticated() {
        if let Some(credentials) = &config.login {
            if let Some(message) = shell.sign_in(credentials).await.message() {
                anyhow::bail!("sign-in failed: {message}");
            }
        }
    }

    if !session.is_authenticated() {
        tracing::warn!(location = %shell.location(), "not signed in; set TMS_USERNAME and TMS_PASSWORD");
        shell.shutdown().await;
        return Ok(());
    }

    let overview = load_overview(shell.services()).await;
    println!("{}", serde_json::to_string_pretty(&overview)?);

    shell.shutdown().await;
    Ok(())
}
