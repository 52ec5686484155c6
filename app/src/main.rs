// app/src/main.rs
//
// Application shell: configuration and tracing bootstrap, session restore,
// one silent login attempt from the remembered-credential slots, and the
// initial route decision. The screens themselves are driven by whatever
// front end embeds the controller crates.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gateway::{AuthApi, GatewayConfig, HttpGateway, TableApi};
use screens::{resolve_route, DashboardScreen, Route, RouteDecision};
use session::{AuthFlowController, CredentialStore, LoginForm, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::load().context("Gateway configuration is unusable")?;
    let hms = Arc::new(HttpGateway::new(&config)?);
    let auth: Arc<dyn AuthApi> = hms.clone();
    let tables: Arc<dyn TableApi> = hms.clone();

    let session = Arc::new(SessionStore::new(auth.clone()));
    let credentials = CredentialStore::open_default()?;
    let flow = AuthFlowController::new(auth, session.clone(), credentials);

    // Restore whatever session the Gateway still honors.
    session.refresh_identity().await;

    // The remembered slots get one silent login attempt; failure just
    // leaves the user on the login screen.
    if session.identity().await.is_none() {
        if let Some(remembered) = flow.remembered() {
            info!(email = %remembered.email, "trying remembered credentials");
            let form = LoginForm {
                email: remembered.email,
                password: remembered.password,
                remember: true,
            };
            if let Err(err) = flow.login(&form).await {
                warn!(error = %err, "remembered-credential login failed");
            }
        }
    }

    let snapshot = session.snapshot().await;
    let start = if snapshot.identity.is_some() {
        Route::Dashboard
    } else {
        Route::Login
    };

    match resolve_route(start, &snapshot) {
        RouteDecision::Render(route) => info!(path = route.path(), "starting at"),
        RouteDecision::Redirect(route) => info!(path = route.path(), "redirected to"),
        RouteDecision::Placeholder => info!("session still resolving"),
    }

    if let Some(identity) = snapshot.identity {
        info!(name = %identity.name, role = %identity.role, "signed in");
        let dashboard = DashboardScreen::new(tables);
        dashboard.mount().await;
        let state = dashboard.state();
        info!(
            patients = state.patient_count,
            recent = state.recent_appointments.len(),
            "dashboard aggregates loaded"
        );
        if let Some(message) = state.error {
            warn!(%message, "dashboard query failed");
        }
    }

    Ok(())
}
